use dvcrust::chart::load_daily_new_cases;
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
    let source = load_daily_new_cases(&cfg, cfg.rolling_window)?;

    // Last smoothed value per canton
    for s in &source.table.series {
        let last = s.values.last().copied().flatten().unwrap_or(0.0);
        println!("{:>3} {:>9.2} {}", s.name, last, s.color.as_deref().unwrap_or("-"));
    }

    let paths = export_chart_source(&cfg.export_dir, "daily_new_cases", &source)?;
    println!("wrote {} and {}", paths.csv.display(), paths.json.display());
    Ok(())
}
