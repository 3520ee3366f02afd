use std::path::PathBuf;

use anyhow::{anyhow, Context};
use clap::Parser;
use ordered_float::NotNan;
use trapmap::{MapConfig, Point, Segment, TrapId, TrapezoidalMap};

type Float = NotNan<f64>;

/// Builds the trapezoidal map of some segments and draws it.
#[derive(Parser)]
struct Args {
    /// A text file with one segment per line, as `x0 y0 x1 y1`.
    input: PathBuf,
    output: PathBuf,

    /// Highlight the cell containing this point.
    #[arg(long, num_args = 2, value_names = ["X", "Y"])]
    query: Vec<f64>,
}

fn parse_segments(input: &str) -> anyhow::Result<Vec<Segment<Float>>> {
    input
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty() && !line.starts_with('#'))
        .map(|(i, line)| -> anyhow::Result<Segment<Float>> {
            let coords = line
                .split_whitespace()
                .map(|c| -> anyhow::Result<Float> {
                    Ok(NotNan::new(c.parse::<f64>()?)?)
                })
                .collect::<anyhow::Result<Vec<Float>>>()
                .with_context(|| format!("line {}", i + 1))?;
            let [x0, y0, x1, y1] = coords[..] else {
                return Err(anyhow!("line {}: expected 4 coordinates", i + 1));
            };
            Ok(Segment::new(Point::new(x0, y0), Point::new(x1, y1)))
        })
        .collect()
}

pub fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();
    let args = Args::parse();

    let input = std::fs::read_to_string(&args.input)?;
    let segments = parse_segments(&input)?;
    if segments.is_empty() {
        return Err(anyhow!("no segments in {}", args.input.display()));
    }

    // Pad the segments' bounding box, so that the boundary cells are visible.
    let xs = segments.iter().flat_map(|s| [s.start.x, s.end.x]);
    let ys = segments.iter().flat_map(|s| [s.start.y, s.end.y]);
    let (min_x, max_x) = (xs.clone().min().unwrap(), xs.max().unwrap());
    let (min_y, max_y) = (ys.clone().min().unwrap(), ys.max().unwrap());
    let pad = 0.1 * (max_x - min_x).max(max_y - min_y).into_inner() + 1.0;
    let cfg = MapConfig {
        min: Point::new(min_x - pad, min_y - pad),
        max: Point::new(max_x + pad, max_y + pad),
        ..MapConfig::default()
    };

    let mut map = TrapezoidalMap::with_config(cfg);
    for (i, seg) in segments.into_iter().enumerate() {
        map.insert_segment(seg)
            .with_context(|| format!("inserting segment {i}"))?;
    }

    let highlighted = args
        .query
        .chunks_exact(2)
        .map(|q| -> anyhow::Result<TrapId> {
            let p = Point::new(NotNan::new(q[0])?, NotNan::new(q[1])?);
            let id = map.locate(&p)?;
            log::info!("{p:?} is in {id:?}");
            Ok(id)
        })
        .collect::<anyhow::Result<Vec<TrapId>>>()?;

    // The SVG y axis points down, so flip everything.
    let cfg = map.config();
    let pt = |p: &Point<Float>| (p.x.into_inner(), -p.y.into_inner());
    let (w, h) = (cfg.max.x - cfg.min.x, cfg.max.y - cfg.min.y);
    let stroke_width = w.max(h).into_inner() / 500.0;
    let mut document = svg::Document::new().set(
        "viewBox",
        (
            cfg.min.x.into_inner(),
            -cfg.max.y.into_inner(),
            w.into_inner(),
            h.into_inner(),
        ),
    );

    for cell in map.cells() {
        let [a, b, c, d] = cell.corners();
        let mut data = svg::node::element::path::Data::new().move_to(pt(&a));
        for p in [b, c, d] {
            data = data.line_to(pt(&p));
        }
        let fill = if highlighted.contains(&cell.id) {
            "orange"
        } else {
            "none"
        };
        let path = svg::node::element::Path::new()
            .set("d", data.close())
            .set("fill", fill)
            .set("stroke", "gray")
            .set("stroke-width", stroke_width);
        document = document.add(path);
    }

    for seg in map.segments() {
        let (x1, y1) = pt(&seg.start);
        let (x2, y2) = pt(&seg.end);
        let line = svg::node::element::Line::new()
            .set("x1", x1)
            .set("y1", y1)
            .set("x2", x2)
            .set("y2", y2)
            .set("stroke", "black")
            .set("stroke-width", 2.0 * stroke_width);
        document = document.add(line);
    }

    svg::save(&args.output, &document)?;
    log::info!("wrote {} cells to {}", map.cell_count(), args.output.display());

    Ok(())
}
