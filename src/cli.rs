use clap::{Parser, Subcommand};
use skin_intake_common::{Gender, Platform, SkinType};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "skin-intake")]
#[command(about = "肌分析の受付ウィザード（写真 → 入力フォーム → 解析結果）", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// プラットフォーム (native/web)。省略時は設定ファイルの値
    #[arg(long, global = true)]
    pub platform: Option<Platform>,

    /// 解析バックエンドのURL（例: http://localhost:8000）
    #[arg(long, global = true)]
    pub backend_url: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 写真と入力項目を指定して一括で解析
    Analyze {
        /// ギャラリーの写真（.jpg / .png）
        #[arg(short, long, conflicts_with_all = ["data_url", "camera"])]
        image: Option<PathBuf>,

        /// ページ内カメラのフレーム（Data URLのテキストまたは画像ファイル）
        #[arg(long, conflicts_with = "camera")]
        data_url: Option<PathBuf>,

        /// 撮影コマンドで撮影
        #[arg(long)]
        camera: bool,

        /// 名前
        #[arg(short, long, default_value = "")]
        name: String,

        /// 年齢
        #[arg(short, long, default_value = "")]
        age: String,

        /// 性別 (male/female/other)
        #[arg(short, long)]
        gender: Option<Gender>,

        /// 肌タイプ (combination/dry/normal/oily/sensitive)
        #[arg(short, long)]
        skin_type: Option<SkinType>,

        /// 解析結果のJSONだけを出力
        #[arg(long)]
        json: bool,
    },

    /// 対話式ウィザード
    Wizard,

    /// 設定を表示/編集
    Config {
        /// 送信先URLを設定
        #[arg(long)]
        set_backend_url: Option<String>,

        /// プラットフォームを設定 (native/web)
        #[arg(long)]
        set_platform: Option<Platform>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}
