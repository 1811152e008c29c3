//! Text rendering for reports and roughness tables.

use meshstat::stats::Summary;
use meshstat::{EntityListing, GeomDim, ModelReport};

use crate::VertexRow;

/// Summary sections in print order: (section, title, verbose noun).
fn summaries(report: &ModelReport) -> [(Option<&Summary>, &'static str, &'static str); 6] {
    [
        (
            report.surfaces_per_volume.as_ref(),
            "Surfaces per Volume",
            "number of Surfaces per Volume",
        ),
        (
            report.triangles_per_surface.as_ref(),
            "Triangles per Surface",
            "number of Triangles per Surface",
        ),
        (
            report.triangles_per_vertex.as_ref(),
            "Triangles per Vertex",
            "number of Triangles per Vertex",
        ),
        (report.aspect_ratio.as_ref(), "Triangle Aspect Ratio", "Triangle Aspect Ratio"),
        (report.area.as_ref(), "Triangle Area", "Triangle Area"),
        (report.coarseness.as_ref(), "Coarseness", "Coarseness"),
    ]
}

pub fn print_report(report: &ModelReport, verbose: bool) {
    if let Some(nr) = &report.native_ranges {
        let rows = [
            ("vertices", nr.vertices),
            ("triangles", nr.triangles),
            ("entity sets", nr.entity_sets),
        ];
        for (kind, n) in rows {
            if verbose {
                println!("There are {} entities of native type {} in this model", n, kind);
            } else {
                println!("Type {} : {}", kind, n);
            }
        }
    }

    if let Some(er) = &report.entity_ranges {
        for dim in GeomDim::ALL.into_iter().rev() {
            let name = dim.plural();
            if verbose {
                println!("There are {} {} in this model", er.get(dim), name);
            } else {
                println!("{} : {}", name, er.get(dim));
            }
        }
    }

    for (summary, title, noun) in summaries(report) {
        let Some(summary) = summary else { continue };
        if verbose {
            for (stat, value) in summary.entries() {
                println!("The {} {} in this model is {}.", stat, noun, value);
            }
        } else {
            println!("{}:", title);
            for (stat, value) in summary.entries() {
                println!("{} : {}", stat, value);
            }
        }
    }

    if let Some(r) = &report.roughness {
        if verbose {
            println!(
                "The area-weighted average Roughness in this model is {}.",
                r.weighted_average
            );
            for (stat, value) in r.local.entries() {
                println!("The {} local Roughness in this model is {}.", stat, value);
            }
        } else {
            println!("Roughness:");
            println!("weighted average : {}", r.weighted_average);
            for (stat, value) in r.local.entries() {
                println!("{} : {}", stat, value);
            }
        }
    }

    if let Some(rows) = &report.spv_data {
        print_listing("Volume (Global ID)", "Surfaces", rows);
    }
    if let Some(rows) = &report.tps_data {
        print_listing("Surface (Global ID)", "Triangles", rows);
    }
}

fn print_listing(entity: &str, children: &str, rows: &[EntityListing]) {
    println!("{:<30}{}", entity, children);
    for row in rows {
        println!("({}):    {}", row.global_id, row.count);
    }
}

pub fn print_roughness(rows: &[VertexRow], weighted_average: f64, verbose: bool) {
    if verbose {
        println!(
            "{:>12} {:>12} {:>12} {:>5} {:>14} {:>14}",
            "x", "y", "z", "tris", "curvature", "roughness"
        );
    }
    for row in rows {
        let [x, y, z] = row.position;
        println!(
            "{:>12.6} {:>12.6} {:>12.6} {:>5} {:>14.8} {:>14.8}",
            x, y, z, row.triangles, row.curvature, row.roughness
        );
    }
    if verbose {
        println!("Area-weighted average roughness: {}", weighted_average);
    } else {
        println!("weighted average : {}", weighted_average);
    }
}
