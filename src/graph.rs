use crate::chart::{ChartData, ChartKind, ChartSpec, Slice};
use crate::{OutputFormat, RenderOptions};
use anyhow::{anyhow, Context, Result};
use image::ImageEncoder;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::f64::consts::PI;
use std::fmt::Debug;
use std::ops::Range;

const SERIES_COLOR: RGBColor = RGBColor(84, 112, 198);

/// Wedge colors, cycled when a pie has more slices than entries
const PALETTE: [RGBColor; 9] = [
    RGBColor(84, 112, 198),
    RGBColor(145, 204, 117),
    RGBColor(250, 200, 88),
    RGBColor(238, 102, 102),
    RGBColor(115, 192, 222),
    RGBColor(59, 162, 114),
    RGBColor(252, 132, 82),
    RGBColor(154, 96, 180),
    RGBColor(234, 124, 204),
];

/// Render a chart specification to image bytes (PNG or SVG)
pub fn render_chart(spec: &ChartSpec, options: &RenderOptions) -> Result<Vec<u8>> {
    options.validate()?;
    let size = (options.width, options.height);

    match options.format {
        OutputFormat::Png => {
            let mut buffer = vec![0u8; options.rgb_buffer_len()?];
            {
                let root = BitMapBackend::with_buffer(&mut buffer, size).into_drawing_area();
                draw_chart(&root, spec)?;
            }
            encode_png(&buffer, options.width, options.height)
        }
        OutputFormat::Svg => {
            let mut svg = String::new();
            {
                let root = SVGBackend::with_string(&mut svg, size).into_drawing_area();
                draw_chart(&root, spec)?;
            }
            Ok(svg.into_bytes())
        }
    }
}

fn draw_chart<DB: DrawingBackend>(root: &DrawingArea<DB, Shift>, spec: &ChartSpec) -> Result<()> {
    root.fill(&WHITE).map_err(draw_err("Failed to fill background"))?;

    match (&spec.kind, &spec.data) {
        (ChartKind::Bar, ChartData::Series { categories, values }) => {
            draw_bars(root, &spec.title, categories, values)?
        }
        (ChartKind::Line, ChartData::Series { categories, values }) => {
            draw_line(root, &spec.title, categories, values)?
        }
        (ChartKind::Pie, ChartData::Grouped(slices)) => draw_pie(root, &spec.title, slices)?,
        (kind, _) => anyhow::bail!("Unsupported data layout for {} chart", kind.as_str()),
    }

    root.present().map_err(draw_err("Failed to present drawing"))?;
    Ok(())
}

fn draw_bars<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    title: &str,
    categories: &[String],
    values: &[f64],
) -> Result<()> {
    check_series(categories, values)?;

    let num_categories = categories.len();
    let x_range = 0.0..(num_categories as f64);
    let y_range = value_range(values, true);

    let mut chart = ChartBuilder::on(root)
        .margin(10)
        .caption(title, ("sans-serif", 20))
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(x_range, y_range)
        .map_err(draw_err("Failed to build chart"))?;

    chart
        .configure_mesh()
        .x_labels(num_categories)
        .x_label_formatter(&|x| category_label(categories, *x))
        .draw()
        .map_err(draw_err("Failed to draw mesh"))?;

    let bar_width = 0.8;
    chart
        .draw_series(values.iter().enumerate().map(|(idx, &y)| {
            let x_center = idx as f64 + 0.5;
            Rectangle::new(
                [(x_center - bar_width / 2.0, 0.0), (x_center + bar_width / 2.0, y)],
                SERIES_COLOR.filled(),
            )
        }))
        .map_err(draw_err("Failed to draw bars"))?;

    Ok(())
}

fn draw_line<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    title: &str,
    categories: &[String],
    values: &[f64],
) -> Result<()> {
    check_series(categories, values)?;

    let num_categories = categories.len();
    let x_range = 0.0..(num_categories as f64);
    let y_range = value_range(values, false);

    let mut chart = ChartBuilder::on(root)
        .margin(10)
        .caption(title, ("sans-serif", 20))
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(x_range, y_range)
        .map_err(draw_err("Failed to build chart"))?;

    chart
        .configure_mesh()
        .x_labels(num_categories)
        .x_label_formatter(&|x| category_label(categories, *x))
        .draw()
        .map_err(draw_err("Failed to draw mesh"))?;

    let points: Vec<(f64, f64)> = values
        .iter()
        .enumerate()
        .map(|(idx, &y)| (idx as f64 + 0.5, y))
        .collect();

    chart
        .draw_series(LineSeries::new(points.clone(), SERIES_COLOR.stroke_width(2)))
        .map_err(draw_err("Failed to draw line series"))?;
    chart
        .draw_series(points.into_iter().map(|p| Circle::new(p, 3, SERIES_COLOR.filled())))
        .map_err(draw_err("Failed to draw line markers"))?;

    Ok(())
}

fn draw_pie<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    title: &str,
    slices: &[Slice],
) -> Result<()> {
    let total: usize = slices.iter().map(|s| s.value).sum();
    if total == 0 {
        anyhow::bail!("Cannot create pie chart with no data");
    }

    let area = root
        .titled(title, ("sans-serif", 20))
        .map_err(draw_err("Failed to draw title"))?;
    let (width, height) = area.dim_in_pixel();

    // Radius is 60% of half the shorter side
    let center = (width as i32 / 2, height as i32 / 2);
    let radius = width.min(height) as f64 * 0.3;

    for (idx, wedge) in wedge_angles(slices).into_iter().enumerate() {
        let color = PALETTE[idx % PALETTE.len()];
        let points = wedge_polygon(center, radius, wedge.clone());
        area.draw(&Polygon::new(points, color.filled()))
            .map_err(draw_err("Failed to draw wedge"))?;

        let mid = (wedge.start + wedge.end) / 2.0;
        let label_pos = polar(center, radius + 16.0, mid);
        let slice = &slices[idx];
        area.draw(&Text::new(
            format!("{} ({})", slice.name, slice.value),
            label_pos,
            ("sans-serif", 14).into_font().color(&BLACK),
        ))
        .map_err(draw_err("Failed to draw label"))?;
    }

    Ok(())
}

/// Angular span of each slice in radians, clockwise from 12 o'clock
pub fn wedge_angles(slices: &[Slice]) -> Vec<Range<f64>> {
    let total: usize = slices.iter().map(|s| s.value).sum();
    if total == 0 {
        return Vec::new();
    }

    let mut start = -PI / 2.0;
    slices
        .iter()
        .map(|s| {
            let sweep = 2.0 * PI * s.value as f64 / total as f64;
            let range = start..(start + sweep);
            start += sweep;
            range
        })
        .collect()
}

fn wedge_polygon(center: (i32, i32), radius: f64, wedge: Range<f64>) -> Vec<(i32, i32)> {
    let steps = (((wedge.end - wedge.start) / (2.0 * PI)) * 90.0).ceil().max(1.0) as usize;
    let mut points = Vec::with_capacity(steps + 2);
    points.push(center);
    for i in 0..=steps {
        let angle = wedge.start + (wedge.end - wedge.start) * i as f64 / steps as f64;
        points.push(polar(center, radius, angle));
    }
    points
}

fn polar(center: (i32, i32), radius: f64, angle: f64) -> (i32, i32) {
    (
        center.0 + (radius * angle.cos()).round() as i32,
        center.1 + (radius * angle.sin()).round() as i32,
    )
}

fn check_series(categories: &[String], values: &[f64]) -> Result<()> {
    if categories.len() != values.len() {
        anyhow::bail!(
            "Categories and values must have the same length (categories: {}, values: {})",
            categories.len(),
            values.len()
        );
    }
    if categories.is_empty() {
        anyhow::bail!("Cannot create chart with no data");
    }
    Ok(())
}

/// Y range with 5% padding. Bars always include zero.
pub fn value_range(values: &[f64], include_zero: bool) -> Range<f64> {
    let mut y_min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let mut y_max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

    if include_zero {
        y_min = y_min.min(0.0);
        y_max = y_max.max(0.0);
    }

    if y_min == y_max {
        (y_min - 1.0)..(y_max + 1.0)
    } else {
        let padding = (y_max - y_min) * 0.05;
        let lower = if include_zero && y_min == 0.0 { 0.0 } else { y_min - padding };
        lower..(y_max + padding)
    }
}

fn category_label(categories: &[String], x: f64) -> String {
    let idx = x.floor() as usize;
    if x >= 0.0 && idx < categories.len() {
        categories[idx].clone()
    } else {
        String::new()
    }
}

fn encode_png(buffer: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
    let mut png_bytes = Vec::new();
    {
        let encoder = image::codecs::png::PngEncoder::new(&mut png_bytes);
        encoder
            .write_image(buffer, width, height, image::ColorType::Rgb8)
            .context("Failed to encode PNG")?;
    }
    Ok(png_bytes)
}

fn draw_err<E: Debug>(what: &'static str) -> impl Fn(E) -> anyhow::Error {
    move |e| anyhow!("{}: {:?}", what, e)
}
