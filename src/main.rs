use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use classcard_autopilot::orchestrator::RangeReport;
use classcard_autopilot::utils::logging;
use classcard_autopilot::{App, Config, ModeTag};

/// ClassCard 学习模式自动化
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// 配置文件（TOML），不指定时使用默认值 + 环境变量
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// 登录账号（与 --pw 一起使用，确认后保存到账号文件）
    #[arg(long, global = true)]
    id: Option<String>,

    /// 登录密码
    #[arg(long, global = true)]
    pw: Option<String>,

    /// 显示详细日志
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 列出班级
    Classes,
    /// 列出班级中的词集
    Sets {
        #[arg(long = "class")]
        class_id: String,
    },
    /// 对单个词集执行学习模式
    Run {
        #[arg(long = "class")]
        class_id: String,
        #[arg(long = "set")]
        set_id: u64,
        #[command(flatten)]
        modes: ModesArg,
    },
    /// 对 ID 范围内的词集执行学习模式（Ctrl-C 在下一个安全点停止）
    Range {
        #[arg(long = "class")]
        class_id: String,
        #[arg(long)]
        start: u64,
        #[arg(long)]
        end: u64,
        #[command(flatten)]
        modes: ModesArg,
    },
    /// 重置词集的学习记录
    ResetViews {
        #[arg(long = "class")]
        class_id: String,
        #[arg(long = "set")]
        set_id: u64,
        #[arg(long, default_value_t = 1)]
        count: u32,
    },
}

#[derive(Args, Debug)]
struct ModesArg {
    /// 以逗号分隔的模式：recall, spelling, test（也接受韩文名称）
    #[arg(long, default_value = "recall,spelling,test")]
    modes: String,
}

impl ModesArg {
    fn parse(&self) -> Result<Vec<ModeTag>> {
        let modes = ModeTag::parse_list(&self.modes)?;
        if modes.is_empty() {
            anyhow::bail!("至少需要一个学习模式");
        }
        Ok(modes)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 加载配置
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::from_env()?,
    };

    // 初始化日志
    logging::init(cli.verbose || config.verbose_logging);

    // 初始化应用并登录
    let mut app = App::initialize(config).await?;
    let credentials = app.resolve_credentials(cli.id, cli.pw).await?;
    app.login(&credentials).await?;

    match cli.command {
        Command::Classes => {
            let classes = app.classes().await?;
            info!("📋 共 {} 个班级", classes.len());
            for class in classes {
                info!("  {} - {}", class.class_id, class.name);
            }
        }
        Command::Sets { class_id } => {
            let sets = app.sets(&class_id).await?;
            info!("📋 班级 {} 共 {} 个词集", class_id, sets.len());
            for set in sets {
                match set.card_count {
                    Some(count) => info!("  {} - {} ({} 张)", set.set_id, set.title, count),
                    None => info!("  {} - {}", set.set_id, set.title),
                }
            }
        }
        Command::Run {
            class_id,
            set_id,
            modes,
        } => {
            let report = app.run(&class_id, set_id, &modes.parse()?).await;
            app.finish(&RangeReport {
                sets: vec![report],
                cancelled: false,
            });
        }
        Command::Range {
            class_id,
            start,
            end,
            modes,
        } => {
            let modes = modes.parse()?;
            let token = CancellationToken::new();
            let ctrl_c = token.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("⏹️ 收到 Ctrl-C，当前学习模式结束后停止");
                    ctrl_c.cancel();
                }
            });

            let report = app
                .run_range(&class_id, start, end, &modes, &token)
                .await?;
            app.finish(&report);
        }
        Command::ResetViews {
            class_id,
            set_id,
            count,
        } => {
            app.reset_views(&class_id, set_id, count).await?;
        }
    }

    Ok(())
}
