use anyhow::{Context, Result};
use timed_quiz::{logger, App, Config, TerminalPresenter};

const USAGE: &str = "用法: timed_quiz [BANK_FILE] | timed_quiz log [--json]";

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::load()?;

    // 初始化日志
    logger::init_with(config.verbose_logging);

    let args: Vec<String> = std::env::args().skip(1).collect();
    let app = App::initialize(config);

    match args.first().map(String::as_str) {
        Some("log") => {
            let json = args.iter().any(|arg| arg == "--json");
            app.show_log(json, &mut std::io::stdout())?;
        }
        Some("-h") | Some("--help") => println!("{}", USAGE),
        bank_arg => {
            let bank_path = bank_arg
                .map(str::to_string)
                .or_else(|| app.config().bank_file.clone())
                .context(USAGE)?;

            let mut presenter = TerminalPresenter::stdio();
            app.run_quiz(&bank_path, &mut presenter).await?;
        }
    }

    Ok(())
}
