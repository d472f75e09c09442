use envconfig::Envconfig;

#[derive(Envconfig, Clone)]
pub struct Config {
    /// Log messages instead of queueing them, for local runs.
    #[envconfig(default = "false")]
    pub print_sink: bool,

    /// Required unless PRINT_SINK is set.
    pub sqs_queue_url: Option<String>,
}
