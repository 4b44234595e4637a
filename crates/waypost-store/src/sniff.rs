//! Content-type detection
//!
//! Extension lookup first, then SVG markup, then magic-byte signatures
//! through a pluggable [`Sniffer`].

/// Number of leading bytes inspected when sniffing
pub const SNIFF_LEN: usize = 512;

/// Fallback content type
pub const OCTET_STREAM: &str = "application/octet-stream";

const SVG_NAMESPACE: &str = r#"xmlns="http://www.w3.org/2000/svg""#;

/// Content type from a file name's extension, without touching the file
pub fn from_extension(name: &str) -> Option<&'static str> {
    mime_guess::from_path(name).first_raw()
}

/// Extension-less SVG: an `<svg` tag plus the SVG namespace declaration
pub fn is_svg(preview: &[u8]) -> bool {
    let text = String::from_utf8_lossy(preview);
    text.contains("<svg") && text.contains(SVG_NAMESPACE)
}

/// Classifies content from its leading bytes
pub trait Sniffer: Send + Sync {
    /// Return a content type, or `None` when unrecognized
    fn sniff(&self, header: &[u8]) -> Option<&'static str>;
}

/// Magic-number sniffer backed by the `infer` matcher set
#[derive(Clone, Copy, Debug, Default)]
pub struct InferSniffer;

impl Sniffer for InferSniffer {
    fn sniff(&self, header: &[u8]) -> Option<&'static str> {
        infer::get(header).map(|kind| kind.mime_type())
    }
}

/// Classify peeked bytes: SVG markup first, then the sniffer, then
/// [`OCTET_STREAM`].
pub fn detect(preview: &[u8], sniffer: &dyn Sniffer) -> &'static str {
    if is_svg(preview) {
        return "image/svg+xml";
    }
    sniffer.sniff(preview).unwrap_or(OCTET_STREAM)
}
