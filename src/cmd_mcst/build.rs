use mcst::libs::supertree::config::RunConfig;
use mcst::libs::supertree::{parser, supertree, writer, LabelTable};
use std::io::{Read, Write};

fn read_input(infile: &str) -> anyhow::Result<String> {
    let mut reader = intspan::reader(infile);
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    Ok(text)
}

/// The primary, flag-driven path (spec §6): parse the source trees,
/// compute the supertree, and emit it in whichever of `-p`/`-n`/`-k`
/// formats were requested.
pub fn execute(config: &RunConfig) -> anyhow::Result<()> {
    let text = read_input(&config.infile)?;
    let mut labels = LabelTable::new();
    let mut trees = parser::parse_trees(&text, &mut labels)?;

    if !config.weighted {
        for t in &mut trees {
            t.weight = 1;
        }
    }

    let tree = if config.dump_gml || config.dump_dot {
        let human = config.human_labels;
        let mut sink = |idx: usize, kind: &str, st: &mcst::libs::supertree::stgraph::StGraph| {
            if config.dump_gml {
                let path = format!("{}{}.gml", kind, idx);
                let _ = std::fs::write(&path, writer::write_stgraph_gml(st, &labels, human));
            }
            if config.dump_dot {
                let path = format!("{}{}.dot", kind, idx);
                let _ = std::fs::write(&path, writer::write_stgraph_dot(st, &labels, human));
            }
        };
        let mut dumper = supertree::Dumper::new(&mut sink);
        supertree::build_supertree_with_dump(&trees, &labels, config.rod1(), Some(&mut dumper))?
    } else {
        supertree::build_supertree(&trees, &labels, config.rod1())?
    };

    if let Some(path) = &config.postscript {
        let mut out = intspan::writer(path);
        out.write_all(writer::write_postscript(&tree, &config.infile).as_bytes())?;
    }
    if let Some(path) = &config.nexus {
        let mut out = intspan::writer(path);
        out.write_all(writer::write_nexus(&tree, "supertree").as_bytes())?;
    }
    if let Some(path) = &config.newick {
        let mut out = intspan::writer(path);
        out.write_all((writer::write_newick(&tree) + "\n").as_bytes())?;
    }

    if config.verbose {
        eprintln!("mcst: built a supertree over {} labels from {} trees", labels.len(), trees.len());
    }

    Ok(())
}
