use mcst::libs::supertree::config::RunConfig;
use mcst::libs::supertree::{mrp as mrp_lib, parser, LabelTable};
use std::io::Read;

/// spec §6 `-m`: emit an MRP matrix for the source trees; no supertree
/// is computed.
pub fn execute(config: &RunConfig) -> anyhow::Result<()> {
    let mut reader = intspan::reader(&config.infile);
    let mut text = String::new();
    reader.read_to_string(&mut text)?;

    let mut labels = LabelTable::new();
    let mut trees = parser::parse_trees(&text, &mut labels)?;
    if !config.weighted {
        for t in &mut trees {
            t.weight = 1;
        }
    }

    let matrix = mrp_lib::build_mrp_matrix(&trees, &labels);
    let nexus = mrp_lib::write_mrp_nexus(&matrix);

    let path = config.mrp.as_deref().expect("execute is only called when -m is set");
    std::fs::write(path, nexus)?;

    if config.verbose {
        eprintln!("mcst: wrote an MRP matrix with {} taxa to {}", matrix.taxa.len(), path);
    }

    Ok(())
}
