// Runtime driver: load data, bind charts, hand them to the renderers

use crate::binder::bind_dashboard;
use crate::chart::Dashboard;
use crate::config::{DashboardConfig, DataSource};
use crate::data::Dataset;
use crate::fetch::DataClient;
use crate::{graph, html};
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Explicit entry point. Nothing is written unless all three charts bind.
pub fn run_dashboard(config: &DashboardConfig) -> Result<Vec<PathBuf>> {
    let dataset = load_dataset(&config.source())?;
    let dashboard = bind_dashboard(&dataset, &config.binding).context("Failed to bind charts")?;
    write_outputs(&dashboard, config)
}

pub fn load_dataset(source: &DataSource) -> Result<Dataset> {
    match source {
        DataSource::Endpoint(url) => DataClient::with_url(url.clone()).fetch_dataset(),
        DataSource::File(path) => load_file(path),
    }
}

fn load_file(path: &Path) -> Result<Dataset> {
    log::info!("reading dataset from {}", path.display());

    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);

    if is_csv {
        let file = fs::File::open(path)
            .with_context(|| format!("Failed to open {}", path.display()))?;
        Dataset::from_csv(file).with_context(|| format!("Failed to read CSV {}", path.display()))
    } else {
        let body = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Dataset::from_json_str(&body).with_context(|| format!("Failed to decode {}", path.display()))
    }
}

/// Render every chart first, then write files. Files are staged inside
/// `out_dir` and moved into place together; a failed move removes the files
/// already moved. Files they replaced are not restored.
pub fn write_outputs(dashboard: &Dashboard, config: &DashboardConfig) -> Result<Vec<PathBuf>> {
    let mut outputs: Vec<(PathBuf, Vec<u8>)> = Vec::new();

    if !config.html_only {
        let ext = config.render.format.extension();
        for (id, spec) in dashboard.mounts() {
            let bytes = graph::render_chart(spec, &config.render)
                .with_context(|| format!("Failed to render {}", id))?;
            outputs.push((config.out_dir.join(format!("{}.{}", id, ext)), bytes));
        }
    }

    let options = serde_json::to_vec_pretty(&dashboard.to_echarts_options())
        .context("Failed to serialize chart options")?;
    outputs.push((config.out_dir.join("charts.json"), options));
    outputs.push((config.out_dir.join("dashboard.html"), html::render_page(dashboard)?.into_bytes()));

    fs::create_dir_all(&config.out_dir)
        .with_context(|| format!("Failed to create {}", config.out_dir.display()))?;

    // Everything lands in a staging directory first and is renamed into place
    // only once every file is on disk. The staging directory is removed on drop.
    let staging = tempfile::Builder::new()
        .prefix(".chartbind-")
        .tempdir_in(&config.out_dir)
        .with_context(|| format!("Failed to create staging directory in {}", config.out_dir.display()))?;

    let mut staged = Vec::with_capacity(outputs.len());
    for (path, bytes) in outputs {
        let name = path.file_name().context("Output path has no file name")?;
        let staged_path = staging.path().join(name);
        fs::write(&staged_path, &bytes)
            .with_context(|| format!("Failed to write {}", staged_path.display()))?;
        log::debug!("staged {} ({} bytes)", staged_path.display(), bytes.len());
        staged.push((staged_path, path));
    }

    if let Some((_, blocked)) = staged.iter().find(|(_, to)| to.is_dir()) {
        anyhow::bail!("Output path {} is a directory", blocked.display());
    }

    let mut written: Vec<PathBuf> = Vec::with_capacity(staged.len());
    for (from, to) in staged {
        if let Err(e) = fs::rename(&from, &to) {
            for done in &written {
                let _ = fs::remove_file(done);
            }
            return Err(e).with_context(|| format!("Failed to move {} into place", to.display()));
        }
        log::info!("wrote {}", to.display());
        written.push(to);
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{OutputFormat, RenderOptions};

    const EXAMPLE: &str = r#"[{"region":"east","product":"A","sales":10},
        {"region":"west","product":"B","sales":20},
        {"region":"east","product":"A","sales":5}]"#;

    #[test]
    fn test_html_only_run_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("data.json");
        fs::write(&input, EXAMPLE).unwrap();

        let config = DashboardConfig {
            input: Some(input),
            out_dir: dir.path().join("out"),
            html_only: true,
            ..DashboardConfig::default()
        };

        let written = run_dashboard(&config).unwrap();
        assert_eq!(written.len(), 2);

        let options: serde_json::Value =
            serde_json::from_slice(&fs::read(dir.path().join("out/charts.json")).unwrap()).unwrap();
        assert_eq!(options["chart1"]["title"]["text"], "sales by region");
        assert_eq!(options["chart2"]["series"][0]["data"][0]["name"], "A");
        assert_eq!(options["chart3"]["title"]["text"], "sales Trend");
    }

    #[test]
    fn test_failed_write_leaves_no_partial_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("data.json");
        fs::write(&input, EXAMPLE).unwrap();

        let out_dir = dir.path().join("out");
        // A directory where dashboard.html should go blocks the move after
        // charts.json has been staged.
        fs::create_dir_all(out_dir.join("dashboard.html").join("occupied")).unwrap();

        let config = DashboardConfig {
            input: Some(input),
            out_dir: out_dir.clone(),
            html_only: true,
            ..DashboardConfig::default()
        };
        let err = run_dashboard(&config).unwrap_err();
        assert!(err.to_string().contains("is a directory"));

        let leftovers: Vec<_> = fs::read_dir(&out_dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(leftovers, vec!["dashboard.html".to_string()]);
    }

    #[test]
    fn test_full_run_renders_images() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("data.json");
        fs::write(&input, EXAMPLE).unwrap();

        let config = DashboardConfig {
            input: Some(input),
            out_dir: dir.path().join("out"),
            render: RenderOptions {
                width: 320,
                height: 240,
                format: OutputFormat::Png,
            },
            ..DashboardConfig::default()
        };

        let written = run_dashboard(&config).unwrap();
        assert_eq!(written.len(), 5);
        for id in ["chart1", "chart2", "chart3"] {
            let bytes = fs::read(dir.path().join("out").join(format!("{}.png", id))).unwrap();
            assert_eq!(&bytes[..8], &[137, 80, 78, 71, 13, 10, 26, 10]);
        }
    }

    #[test]
    fn test_csv_input() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("data.CSV");
        fs::write(&input, "region,product,sales\neast,A,10\nwest,B,20\n").unwrap();

        let ds = load_dataset(&DataSource::File(input)).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records()[1]["sales"], 20);
    }

    #[test]
    fn test_bind_failure_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("data.json");
        fs::write(&input, r#"[{"region":"east","sales":1}]"#).unwrap();

        let out_dir = dir.path().join("out");
        let config = DashboardConfig {
            input: Some(input),
            out_dir: out_dir.clone(),
            html_only: true,
            ..DashboardConfig::default()
        };

        let err = run_dashboard(&config).unwrap_err();
        assert!(format!("{:#}", err).contains("categorical"));
        assert!(!out_dir.exists());
    }
}
