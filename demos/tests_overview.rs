use dvcrust::chart::load_tests_overview;
use dvcrust::io::export::export_chart_source;
use dvcrust::PipelineConfig;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dvcrust=info".into()),
        )
        .init();

    let cfg = PipelineConfig::from_env()?;
    let source = load_tests_overview(&cfg, cfg.initial_range_days)?;

    let (from, to) = source.initial_range;
    println!("initial range: {} .. {}", from, to);
    println!(
        "positive rate color range: {:.4} .. {:.4}",
        source.color_mapper.low, source.color_mapper.high
    );

    let paths = export_chart_source(&cfg.export_dir, "tests_overview", &source)?;
    println!("wrote {} and {}", paths.csv.display(), paths.json.display());
    Ok(())
}
