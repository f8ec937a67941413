/// Default values for configuration fields

pub fn tcp_nodelay() -> bool {
    true
}

pub fn timeout_secs() -> u64 {
    60
}

pub fn max_body_size() -> usize {
    10  // Upload limit in MB
}

pub fn max_concurrent_requests() -> usize {
    1000
}

pub fn allowed_origins() -> Vec<String> {
    vec!["*".to_string()]
}

pub fn streaming_threshold_mb() -> u64 {
    8  // Files larger than 8MB are streamed instead of read whole
}

pub fn enable_compression() -> bool {
    true
}

// Security defaults
pub const PLACEHOLDER_SIGNING_SECRET: &str = "change-me-in-production";

pub fn signing_secret() -> String {
    PLACEHOLDER_SIGNING_SECRET.to_string()
}

pub fn security_settings() -> super::models::SecuritySettings {
    super::models::SecuritySettings {
        api_key: String::new(),
        signing_secret: signing_secret(),
    }
}

// Storage defaults
pub fn storage_backend() -> super::models::BackendKind {
    super::models::BackendKind::Local
}

pub fn retention() -> super::models::RetentionMode {
    super::models::RetentionMode::Permanent
}

pub fn url_expiration_secs() -> u64 {
    3600
}

pub fn timestamp_prefix() -> bool {
    true
}

pub fn permanent_dir() -> String {
    "uploads/permanent".to_string()
}

pub fn temp_dir() -> String {
    "uploads/temp".to_string()
}

pub fn local_settings() -> super::models::LocalSettings {
    super::models::LocalSettings {
        permanent_dir: permanent_dir(),
        temp_dir: temp_dir(),
    }
}

pub fn s3_region() -> String {
    "us-east-1".to_string()
}

pub fn permanent_prefix() -> String {
    "permanent/".to_string()
}

pub fn temp_prefix() -> String {
    "temp/".to_string()
}

pub fn s3_settings() -> super::models::S3Settings {
    super::models::S3Settings {
        endpoint_url: String::new(),
        region: s3_region(),
        access_key_id: String::new(),
        secret_access_key: String::new(),
        bucket_name: String::new(),
        permanent_prefix: permanent_prefix(),
        temp_prefix: temp_prefix(),
    }
}

pub fn storage_settings() -> super::models::StorageSettings {
    super::models::StorageSettings {
        backend: storage_backend(),
        retention: retention(),
        url_expiration_secs: url_expiration_secs(),
        timestamp_prefix: timestamp_prefix(),
        local: local_settings(),
        s3: s3_settings(),
    }
}

pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# ===============================================================================
# imgvault Configuration
# ===============================================================================

[server]
# Network
host = "0.0.0.0"                     # Server bind address (0.0.0.0 = all interfaces)
port = 3000                          # Server port
base_url = "http://localhost:3000"   # Public base URL prepended to signed file links

# Performance
tcp_nodelay = true                   # Disable Nagle's algorithm (lower latency)
timeout_secs = 60                    # Request timeout in seconds
max_concurrent_requests = 1000       # Max simultaneous connections
max_body_size_mb = 10                # Max upload size in MB
streaming_threshold_mb = 8           # Files >8MB are streamed, smaller ones read whole
enable_compression = true            # HTTP compression (gzip/brotli/deflate)

# CORS
allowed_origins = ["*"]              # "*" = all origins | ["https://example.com"] for production

# ===============================================================================
# SECURITY
# ===============================================================================
[security]
api_key = ""                         # Required in the x-api-key header (override: IMGVAULT_API_KEY)
signing_secret = "change-me-in-production"  # HMAC secret for file tokens (override: IMGVAULT_SIGNING_SECRET)

# ===============================================================================
# STORAGE BACKEND
# ===============================================================================
[storage]
backend = "local"                    # Storage backend: "local" or "remote"
retention = "permanent"              # "permanent" or "temporary" (single overwritable slot)
url_expiration_secs = 3600           # Lifetime of signed file URLs in seconds
timestamp_prefix = true              # Prefix permanent keys with upload time in ms

[storage.local]
permanent_dir = "uploads/permanent"  # Durable uploads (relative to working directory if not absolute)
temp_dir = "uploads/temp"            # Temporary slot

# S3-compatible object store (only used if backend = "remote", requires the s3 feature)
[storage.s3]
endpoint_url = ""                    # Custom endpoint (MinIO, R2, ...); empty = AWS
region = "us-east-1"                 # Bucket region
access_key_id = ""                   # Access key (override: IMGVAULT_S3_ACCESS_KEY_ID)
secret_access_key = ""               # Secret key (override: IMGVAULT_S3_SECRET_ACCESS_KEY)
bucket_name = ""                     # Bucket name
permanent_prefix = "permanent/"      # Key prefix for durable uploads
temp_prefix = "temp/"                # Key prefix for the temporary slot
"#;
