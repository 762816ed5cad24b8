use envconfig::Envconfig;

/// Assembler-level tunables. The wire connection to MySQL itself is out of
/// scope here; these are the knobs this layer owns, configured
/// the way `common_kafka::config::KafkaConfig` configures everything else.
#[derive(Envconfig, Clone)]
pub struct AssemblerConfig {
    /// Hint used by callers sizing downstream batches; the assembler itself
    /// always emits exactly one batch per transaction regardless of size.
    #[envconfig(default = "1000")]
    pub max_batch_size_hint: usize,

    /// How long a cached `TableInfoProvider` lookup is trusted before a
    /// caller should consider re-fetching. `CachingTableInfo` does not
    /// enforce this itself — process-lifetime caching is the documented
    /// limitation — but downstream schema-watchers can use this
    /// value to decide when to force a cache rebuild.
    #[envconfig(default = "3600")]
    pub table_info_cache_ttl_secs: u64,
}
