pub mod build;
pub mod cluster_graph;
pub mod mrp;

use clap::*;

/// The single `mcst` command's flags (spec §6's CLI surface table). One
/// flat command rather than a subcommand tree: `-m`/`-c` switch the run
/// mode without giving up the one-positional-argument invocation the
/// spec's table describes.
pub fn make_command() -> Command {
    Command::new("mcst")
        .version(crate_version!())
        .author(crate_authors!())
        .about("Min-cut supertree engine: combine overlapping rooted trees into one consistent supertree")
        .color(ColorChoice::Auto)
        .disable_version_flag(true)
        .after_help(
            r###"
Notes:
* Exactly one of the output flags (-p/-n/-k) is normally given; all three may
  be given together to emit the same supertree in multiple formats.
* -m switches to MRP-matrix export: no supertree is computed.
* -c <k> switches to k-cluster-graph diagnostics: no supertree is computed.

Examples:
1. Build a supertree and write it as Newick:
   $ mcst trees.nwk -k supertree.nwk

2. Run Semple-Steel only (no ROD1 phase):
   $ mcst trees.nwk -a 0 -k supertree.nwk

3. Emit an MRP matrix instead of a supertree:
   $ mcst trees.nwk -m matrix.nex
"###,
        )
        .arg(
            Arg::new("infile")
                .required(true)
                .num_args(1)
                .index(1)
                .help("Input filename. [stdin] for standard input"),
        )
        .arg(
            Arg::new("postscript")
                .short('p')
                .num_args(1)
                .help("Emit the supertree as PostScript to <path>"),
        )
        .arg(
            Arg::new("nexus")
                .short('n')
                .num_args(1)
                .help("Emit the supertree in a NEXUS trees block to <path>"),
        )
        .arg(
            Arg::new("newick")
                .short('k')
                .num_args(1)
                .help("Emit the supertree in Newick format to <path>"),
        )
        .arg(
            Arg::new("mrp")
                .short('m')
                .num_args(1)
                .help("Emit an MRP character matrix for the source trees to <path>; no supertree is computed"),
        )
        .arg(
            Arg::new("algorithm")
                .short('a')
                .num_args(1)
                .value_parser(value_parser!(u8))
                .default_value("1")
                .help("Algorithm selector: 0 = Semple-Steel only, 1 = ROD1 variant"),
        )
        .arg(
            Arg::new("cluster")
                .short('c')
                .num_args(1)
                .value_parser(value_parser!(usize))
                .help("Skip the supertree; emit the k-cluster-graph of the source trees and its components"),
        )
        .arg(
            Arg::new("weighted")
                .short('w')
                .action(ArgAction::SetTrue)
                .help("Respect per-tree weights from the input"),
        )
        .arg(
            Arg::new("labels")
                .short('l')
                .action(ArgAction::SetTrue)
                .help("Include human-readable leaf labels in any emitted graph files"),
        )
        .arg(
            Arg::new("gml")
                .short('g')
                .action(ArgAction::SetTrue)
                .help("Write each intermediate ST and ST/Emax to a GML file"),
        )
        .arg(
            Arg::new("dot")
                .short('d')
                .action(ArgAction::SetTrue)
                .help("Write each intermediate ST and ST/Emax to a Graphviz DOT file"),
        )
        .arg(
            Arg::new("verbose")
                .short('b')
                .action(ArgAction::SetTrue)
                .help("Verbose progress"),
        )
        .arg(
            Arg::new("version")
                .short('v')
                .action(ArgAction::Version)
                .help("Print version and exit"),
        )
}

fn read_config(args: &ArgMatches) -> mcst::libs::supertree::config::RunConfig {
    mcst::libs::supertree::config::RunConfig {
        infile: args.get_one::<String>("infile").unwrap().to_string(),
        postscript: args.get_one::<String>("postscript").cloned(),
        nexus: args.get_one::<String>("nexus").cloned(),
        newick: args.get_one::<String>("newick").cloned(),
        mrp: args.get_one::<String>("mrp").cloned(),
        algorithm: *args.get_one::<u8>("algorithm").unwrap(),
        cluster_k: args.get_one::<usize>("cluster").copied(),
        weighted: args.get_flag("weighted"),
        human_labels: args.get_flag("labels"),
        dump_gml: args.get_flag("gml"),
        dump_dot: args.get_flag("dot"),
        verbose: args.get_flag("verbose"),
    }
}

pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    let config = read_config(args);

    if let Some(k) = config.cluster_k {
        return cluster_graph::execute(&config, k);
    }
    if config.mrp.is_some() {
        return mrp::execute(&config);
    }
    build::execute(&config)
}
