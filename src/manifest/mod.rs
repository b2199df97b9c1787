mod parser;

pub use parser::{
    decode_manifest, list_manifest_files, parse_manifest_dir, CollectionBody, ManifestDecodeError,
    ManifestDocument, ManifestScan, MissingEntry, MANIFEST_EXTENSIONS, MOVIES_MISSING_KEY,
    SHOWS_MISSING_KEY,
};
