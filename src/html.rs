//! Standalone ECharts page with one mount point per chart.

use crate::chart::Dashboard;
use anyhow::{Context, Result};

pub const ECHARTS_SRC: &str = "https://cdn.jsdelivr.net/npm/echarts@5/dist/echarts.min.js";

pub fn render_page(dashboard: &Dashboard) -> Result<String> {
    let mut mounts = String::new();
    let mut script = String::new();

    for (id, spec) in dashboard.mounts() {
        let option = serde_json::to_string(&spec.to_echarts_option())
            .with_context(|| format!("Failed to serialize options for {}", id))?;

        mounts.push_str(&format!("  <div id=\"{}\" class=\"chart\"></div>\n", id));
        script.push_str(&format!(
            "  echarts.init(document.getElementById(\"{}\")).setOption({});\n",
            id,
            escape_script(&option)
        ));
    }

    Ok(format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <title>Dashboard</title>
  <script src="{src}"></script>
  <style>.chart {{ width: 600px; height: 400px; display: inline-block; }}</style>
</head>
<body>
{mounts}<script>
{script}</script>
</body>
</html>
"#,
        src = ECHARTS_SRC,
        mounts = mounts,
        script = script,
    ))
}

/// Keep field values from closing the surrounding script element.
fn escape_script(json: &str) -> String {
    json.replace("</", "<\\/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binder::{bind_dashboard, Binding};
    use crate::data::Dataset;

    #[test]
    fn test_page_has_mount_points() {
        let ds = Dataset::from_json_str(
            r#"[{"region":"east","product":"A","sales":10},
                {"region":"west","product":"B","sales":20}]"#,
        )
        .unwrap();
        let dash = bind_dashboard(&ds, &Binding::default()).unwrap();
        let page = render_page(&dash).unwrap();

        for id in ["chart1", "chart2", "chart3"] {
            assert!(page.contains(&format!("<div id=\"{}\"", id)));
            assert!(page.contains(&format!("getElementById(\"{}\")", id)));
        }
        assert!(page.contains("\"type\":\"pie\""));
        assert!(page.contains("sales Trend"));
    }

    #[test]
    fn test_script_close_is_escaped() {
        assert_eq!(escape_script(r#"{"a":"</script>"}"#), r#"{"a":"<\/script>"}"#);
    }
}
