use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::Parser;
use tracing::{error, info};

use reqsuite::assertion::AssertionEngine;
use reqsuite::expander::SpecExpander;
use reqsuite::http::HttpTransport;
use reqsuite::oauth::{OAuth2Client, TokenStore};
use reqsuite::runner::{RunExecutor, RunReporter};
use reqsuite::spec::DocumentLoader;
use reqsuite::variable::ConfigLoader;

pub type Result<T> = std::result::Result<T, anyhow::Error>;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// 集合文档（YAML 或 JSON）
    pub collection: PathBuf,

    /// 日志详细程度，-v 为 debug，-vv 为 trace
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// 只运行同时带有这些标签的请求
    #[arg(short, long, value_delimiter = ',')]
    pub tags: Vec<String>,

    /// 只运行属于这些 suite 的请求
    #[arg(short, long, value_delimiter = ',')]
    pub suites: Vec<String>,

    /// reqsuite.toml 中的环境名
    #[arg(short, long)]
    pub env: Option<String>,

    /// 覆盖文档变量 key=value，可重复
    #[arg(long = "var", value_name = "KEY=VALUE")]
    pub vars: Vec<String>,

    /// 变量配置文件路径
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// 加载、展开、执行并打印报告；返回整个运行是否通过
pub async fn run(cli: Cli) -> Result<bool> {
    let cli_vars = cli
        .vars
        .iter()
        .map(|s| ConfigLoader::parse_cli_var(s))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    let config = ConfigLoader::load(cli.config.as_deref())?;
    let context = ConfigLoader::build_context(&config, cli.env.as_deref(), &cli_vars)?;

    let document = DocumentLoader::new(&context)
        .load(&cli.collection)
        .with_context(|| format!("Failed to load {}", cli.collection.display()))?;

    let token_client = OAuth2Client::new().context("Failed to build token client")?;
    let tokens = TokenStore::acquire(&document.defaults.oauth2, &token_client).await;

    let mut collection = SpecExpander::new(&document).expand(&tokens)?;
    if collection.is_empty() {
        error!("No requests found in {}", cli.collection.display());
        bail!("collection is empty");
    }

    let selected = collection.filter(&cli.tags, &cli.suites);
    if selected.is_empty() {
        error!(
            "No requests match tags {:?} and suites {:?}",
            cli.tags, cli.suites
        );
        bail!("no requests matched the filter");
    }
    info!("Selected {} of {} request(s)", selected.len(), collection.len());

    let reporter = RunReporter::new(cli.verbose > 0);
    reporter.print_header(
        &cli.collection.display().to_string(),
        selected.len(),
        collection.len(),
    );

    let transport = HttpTransport::new();
    let engine = AssertionEngine::new();
    let summary = RunExecutor::new(&transport, &engine)
        .run_with(&mut collection, &selected, |instance| {
            reporter.print_result(instance)
        })
        .await;

    reporter.print_summary(&summary);
    Ok(summary.is_success())
}
