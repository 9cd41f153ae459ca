//! アップロード内容の組み立て
//!
//! HTTPクライアントに依存しない部分（パート名・ファイル名・Data URLの展開）。
//! 実際の送信はCLI側（reqwest）またはWASM側で行う

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::error::{Error, Result};
use crate::types::{ImageReference, ImageSelection, IntakeForm};

/// 送信先パス
pub const ANALYZE_PATH: &str = "/analyze-face";

/// 画像パート名
pub const IMAGE_FIELD: &str = "center";

/// 画像パートのContent-Type
pub const IMAGE_MIME: &str = "image/jpeg";

/// ファイル名が決まらない場合の既定値
pub const DEFAULT_FILE_NAME: &str = "center.jpg";

/// 1回分の送信内容
///
/// `IntakeWizard::begin_submit` が検証済みの値をコピーして返す
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub form: IntakeForm,
    pub selection: ImageSelection,
}

impl UploadRequest {
    /// 画像パートのファイル名
    pub fn file_name(&self) -> String {
        match &self.selection.reference {
            ImageReference::DataUrl(_) => DEFAULT_FILE_NAME.to_string(),
            ImageReference::File(reference) => upload_file_name(reference),
        }
    }

    /// 記録用のテキストパート（`name`, `age`, `gender`, `skinType` の順）
    pub fn text_fields(&self) -> [(&'static str, String); 4] {
        [
            ("name", self.form.name.clone()),
            ("age", self.form.age.clone()),
            ("gender", self.form.gender_value().to_string()),
            ("skinType", self.form.skin_type_value().to_string()),
        ]
    }
}

/// 参照の最後の `/` 区切りをファイル名にする
///
/// 区切りが無ければ参照全体、末尾が空なら `center.jpg`
pub fn upload_file_name(reference: &str) -> String {
    reference
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
        .unwrap_or(DEFAULT_FILE_NAME)
        .to_string()
}

/// `file://` URIをローカルパスに変換（通常のパスはそのまま）
pub fn local_path(reference: &str) -> &str {
    reference.strip_prefix("file://").unwrap_or(reference)
}

/// Data URLの中身
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedDataUrl {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Data URLからMIMEタイプを抽出（無ければ `image/jpeg`）
pub fn data_url_mime_type(data_url: &str) -> &str {
    data_url
        .strip_prefix("data:")
        .and_then(|rest| rest.split([';', ',']).next())
        .filter(|mime| !mime.is_empty())
        .unwrap_or(IMAGE_MIME)
}

/// `data:image/jpeg;base64,/9j/4AAQ...` をバイト列に展開
pub fn decode_data_url(data_url: &str) -> Result<DecodedDataUrl> {
    let rest = data_url
        .strip_prefix("data:")
        .ok_or_else(|| Error::DataUrl("missing `data:` scheme".into()))?;
    let (header, data) = rest
        .split_once(',')
        .ok_or_else(|| Error::DataUrl("missing `,` separator".into()))?;

    if !header.split(';').any(|param| param == "base64") {
        return Err(Error::DataUrl("only base64 data URLs are supported".into()));
    }

    // 折り返し付きのbase64（`base64` コマンドの出力など）も受け付ける
    let data: String = data.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = STANDARD
        .decode(data)
        .map_err(|e| Error::DataUrl(format!("base64 decode failed: {}", e)))?;

    Ok(DecodedDataUrl {
        mime_type: data_url_mime_type(data_url).to_string(),
        bytes,
    })
}

/// バイト列をData URLにエンコード（Webカメラのスクリーンショット相当）
pub fn encode_data_url(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type, STANDARD.encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Gender, SkinType, SourceKind};

    fn request(reference: ImageReference) -> UploadRequest {
        UploadRequest {
            form: IntakeForm {
                name: "Jane".into(),
                age: "30".into(),
                gender: Some(Gender::Female),
                skin_type: Some(SkinType::Oily),
            },
            selection: ImageSelection::new(reference, SourceKind::Gallery),
        }
    }

    #[test]
    fn test_upload_file_name() {
        assert_eq!(upload_file_name("file:///data/user/0/cache/IMG_0042.jpg"), "IMG_0042.jpg");
        assert_eq!(upload_file_name("/tmp/photos/face.png"), "face.png");
        assert_eq!(upload_file_name("face.jpg"), "face.jpg");
        assert_eq!(upload_file_name("/tmp/photos/"), DEFAULT_FILE_NAME);
        assert_eq!(upload_file_name(""), DEFAULT_FILE_NAME);
    }

    #[test]
    fn test_request_file_name_for_inline_capture() {
        let req = request(ImageReference::DataUrl("data:image/jpeg;base64,AAAA".into()));
        assert_eq!(req.file_name(), "center.jpg");

        let req = request(ImageReference::File("/sdcard/DCIM/selfie.jpg".into()));
        assert_eq!(req.file_name(), "selfie.jpg");
    }

    #[test]
    fn test_text_fields_order() {
        let req = request(ImageReference::File("a.jpg".into()));
        let names: Vec<&str> = req.text_fields().iter().map(|(n, _)| *n).collect();
        assert_eq!(names, vec!["name", "age", "gender", "skinType"]);
        assert_eq!(req.text_fields()[3].1, "oily");
    }

    #[test]
    fn test_local_path() {
        assert_eq!(local_path("file:///tmp/a.jpg"), "/tmp/a.jpg");
        assert_eq!(local_path("/tmp/a.jpg"), "/tmp/a.jpg");
    }

    #[test]
    fn test_decode_data_url() {
        let decoded = decode_data_url("data:image/jpeg;base64,/9j/4A==").unwrap();
        assert_eq!(decoded.mime_type, "image/jpeg");
        assert_eq!(decoded.bytes, vec![0xff, 0xd8, 0xff, 0xe0]);
    }

    #[test]
    fn test_decode_wrapped_base64() {
        let decoded = decode_data_url("data:image/jpeg;base64,/9j/\n4A==\r\n").unwrap();
        assert_eq!(decoded.bytes, vec![0xff, 0xd8, 0xff, 0xe0]);

        let decoded = decode_data_url("data:image/jpeg;base64, /9j/ 4A==").unwrap();
        assert_eq!(decoded.bytes, vec![0xff, 0xd8, 0xff, 0xe0]);
    }

    #[test]
    fn test_decode_data_url_errors() {
        assert!(decode_data_url("image/jpeg;base64,AAAA").is_err());
        assert!(decode_data_url("data:image/jpeg;base64").is_err());
        assert!(decode_data_url("data:text/plain,hello").is_err());
        assert!(decode_data_url("data:image/jpeg;base64,@@@").is_err());
    }

    #[test]
    fn test_mime_type_default() {
        assert_eq!(data_url_mime_type("data:image/png;base64,AAAA"), "image/png");
        assert_eq!(data_url_mime_type("data:;base64,AAAA"), "image/jpeg");
    }

    #[test]
    fn test_encode_then_decode() {
        let url = encode_data_url(IMAGE_MIME, b"frame");
        assert!(url.starts_with("data:image/jpeg;base64,"));
        assert_eq!(decode_data_url(&url).unwrap().bytes, b"frame");
    }
}
