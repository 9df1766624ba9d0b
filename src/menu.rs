use argp::FromArgs;

/// A command line toolbox for OpenCTM compressed triangle meshes.
#[derive(FromArgs, Debug)]
pub struct CtmTool {
    /// Be verbose.
    #[argp(switch, short = 'v', global)]
    pub verbose: bool,

    #[argp(subcommand)]
    pub nested: Modules,
}

#[derive(FromArgs, Debug)]
#[argp(subcommand)]
pub enum Modules {
    Info(InfoData),
    Recode(RecodeData),
}

/// Print the header and contents summary of a CTM file
#[derive(FromArgs, Debug)]
#[argp(subcommand, name = "info")]
pub struct InfoData {
    /// CTM file to inspect
    #[argp(positional)]
    pub input: String,
}

/// Re-encode a CTM file with a different method or precision
#[derive(FromArgs, Debug)]
#[argp(subcommand, name = "recode")]
pub struct RecodeData {
    /// Compression method: raw, mg1 or mg2
    #[argp(option, short = 'm')]
    pub method: Option<String>,

    /// MG2 vertex precision (absolute quantization step)
    #[argp(option)]
    pub vertex_precision: Option<f32>,

    /// MG2 normal precision
    #[argp(option)]
    pub normal_precision: Option<f32>,

    /// Replace the file comment
    #[argp(option)]
    pub comment: Option<String>,

    /// Input file to be processed
    #[argp(positional)]
    pub input: String,

    /// Output file to write to
    #[argp(positional)]
    pub output: Option<String>,
}
