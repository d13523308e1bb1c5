pub mod catalog;
pub mod config;
pub mod converter;
pub mod engine;
pub mod events;
pub mod ledger;
pub mod matcher;
pub mod slskd;
pub mod testing;

pub use catalog::{CatalogError, JsonWantList, Track, TrackSource};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, DatabaseConfig,
    SanitizedConfig, SlskdConfig,
};
pub use converter::{
    collect_flac_files, convert_directory, mp3_output_path, AudioTranscoder, ConverterConfig,
    ConverterError, FfmpegTranscoder,
};
pub use engine::{AcquireReport, AcquisitionEngine, CancellationToken, EngineConfig};
pub use events::{AcquisitionEvent, EventEnvelope, EventHandle, MissReason, TierMissReason};
pub use ledger::{DownloadLedger, LedgerError, SqliteLedger};
pub use matcher::{default_tiers, score_offers, select_best, similarity, Candidate, QualityTier};
pub use slskd::{FileListing, Offer, SearchState, SlskdClient, SlskdError, SoulseekClient};
