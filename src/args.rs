use clap::Parser;

/// This is a seat tabulation program for district and party-list election results.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) The JSON configuration of the election (sources, colors, rules).
    /// The flags below override the values in this file.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,
    /// (file path) A reference summary in JSON format. If provided, seattally will
    /// check that the computed summary matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the summary of the election will be written in JSON format
    /// to the given location.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) The district results, one row per candidate.
    #[clap(short, long, value_parser)]
    pub districts: Option<String>,

    /// (file path) The party-list allocation, one row per party.
    #[clap(short, long, value_parser)]
    pub party_list: Option<String>,

    /// (default csv) The type of the district and party-list files: csv or xlsx.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// When using an Excel file, indicates the name of the worksheet to use.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    /// (file path) A JSON results file with both candidates and party list. It is used
    /// when no other source is given or when Google Sheets cannot be reached.
    #[clap(long, value_parser)]
    pub results: Option<String>,

    /// The id of a shared Google spreadsheet to download the data from.
    #[clap(long, value_parser)]
    pub sheet_id: Option<String>,

    /// (default 0) The gid of the district results sheet.
    #[clap(long, value_parser)]
    pub district_gid: Option<String>,

    /// The gid of the party-list sheet.
    #[clap(long, value_parser)]
    pub party_list_gid: Option<String>,

    /// (list of party ids) The parties of a coalition to score against the majority threshold.
    #[clap(long, value_parser)]
    pub coalition: Option<Vec<String>>,

    /// If passed, rankings only count the district seats.
    #[clap(long, takes_value = false)]
    pub district_only: bool,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
