/// Parsed run configuration, threaded from `clap::ArgMatches` into the
/// library entry points (spec §6's flag table).
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub infile: String,
    pub postscript: Option<String>,
    pub nexus: Option<String>,
    pub newick: Option<String>,
    pub mrp: Option<String>,
    /// `-a <n>`: 0 = Semple-Steel only, 1 (default) = ROD1 (phase 1 + 2).
    pub algorithm: u8,
    pub cluster_k: Option<usize>,
    pub weighted: bool,
    pub human_labels: bool,
    pub dump_gml: bool,
    pub dump_dot: bool,
    pub verbose: bool,
}

impl RunConfig {
    /// `-a` selects the contraction algorithm: 1 (default) runs the
    /// ROD1 uncontradicted-nesting phase on top of Semple-Steel.
    pub fn rod1(&self) -> bool {
        self.algorithm != 0
    }
}
