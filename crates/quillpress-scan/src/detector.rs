//! Heuristic threat detector
//!
//! Pure in-memory classification of an uploaded file. This is a placeholder
//! heuristic, not an AV engine; the `Detector` trait is the seam where a
//! signature-database scanner or an external scanning service plugs in
//! without touching the orchestrator.

/// File extensions that are rejected outright, regardless of content.
const SUSPICIOUS_EXTENSIONS: &[&str] = &[".exe", ".bat", ".cmd", ".scr", ".vbs", ".js"];

/// Extensions treated as images for the embedded-script check.
const IMAGE_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".gif", ".bmp", ".webp", ".svg"];

/// Script fragments searched for (case-insensitively) in image bodies.
const SCRIPT_PATTERNS: &[&str] = &["<script", "javascript:", "onerror=", "onload="];

/// Only the head of the buffer is searched for embedded scripts.
const SCRIPT_SCAN_LIMIT: usize = 10_000;

/// A positive classification: human-readable name plus coarse category tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreatMatch {
    pub name: String,
    pub threat_type: String,
}

/// A binary signature to match as a contiguous subsequence of the body.
#[derive(Debug, Clone)]
pub struct ThreatSignature {
    pub pattern: Vec<u8>,
    pub name: String,
    pub threat_type: String,
}

/// Classifies a file body + name as a threat or clean. Implementations must
/// be pure: no I/O, no side effects, deterministic.
pub trait Detector: Send + Sync {
    fn classify(&self, body: &[u8], file_name: &str) -> Option<ThreatMatch>;
}

/// The built-in heuristic detector. Runs three checks in fixed precedence,
/// short-circuiting on the first match: suspicious extension, binary
/// signature, embedded script in images.
pub struct HeuristicDetector {
    signatures: Vec<ThreatSignature>,
}

impl HeuristicDetector {
    pub fn new() -> Self {
        Self::with_signatures(default_signatures())
    }

    /// Create with a custom signature set, e.g. extended per deployment.
    pub fn with_signatures(signatures: Vec<ThreatSignature>) -> Self {
        Self { signatures }
    }

    fn check_extension(&self, file_name: &str) -> Option<ThreatMatch> {
        let lower = file_name.to_lowercase();
        if SUSPICIOUS_EXTENSIONS.iter().any(|ext| lower.ends_with(ext)) {
            // Report the extension in its original case
            let ext = file_name.rsplit('.').next().unwrap_or(file_name);
            return Some(ThreatMatch {
                name: format!("Suspicious file extension: {}", ext),
                threat_type: "suspicious_extension".to_string(),
            });
        }
        None
    }

    fn check_signatures(&self, body: &[u8]) -> Option<ThreatMatch> {
        for signature in &self.signatures {
            if signature.pattern.is_empty() || body.len() < signature.pattern.len() {
                continue;
            }
            if body
                .windows(signature.pattern.len())
                .any(|window| window == signature.pattern.as_slice())
            {
                return Some(ThreatMatch {
                    name: signature.name.clone(),
                    threat_type: signature.threat_type.clone(),
                });
            }
        }
        None
    }

    fn check_embedded_script(&self, body: &[u8]) -> Option<ThreatMatch> {
        let head = &body[..body.len().min(SCRIPT_SCAN_LIMIT)];
        let text = String::from_utf8_lossy(head).to_lowercase();
        if SCRIPT_PATTERNS.iter().any(|pattern| text.contains(pattern)) {
            return Some(ThreatMatch {
                name: "Embedded script detected in image".to_string(),
                threat_type: "embedded_script".to_string(),
            });
        }
        None
    }
}

impl Default for HeuristicDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for HeuristicDetector {
    fn classify(&self, body: &[u8], file_name: &str) -> Option<ThreatMatch> {
        if let Some(threat) = self.check_extension(file_name) {
            return Some(threat);
        }
        if let Some(threat) = self.check_signatures(body) {
            return Some(threat);
        }
        if is_image_file(file_name) {
            if let Some(threat) = self.check_embedded_script(body) {
                return Some(threat);
            }
        }
        None
    }
}

fn is_image_file(file_name: &str) -> bool {
    let lower = file_name.to_lowercase();
    IMAGE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Default binary signature set. A single Windows-executable header for now.
pub fn default_signatures() -> Vec<ThreatSignature> {
    vec![ThreatSignature {
        pattern: vec![0x4D, 0x5A],
        name: "PE Executable".to_string(),
        threat_type: "executable".to_string(),
    }]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector() -> HeuristicDetector {
        HeuristicDetector::new()
    }

    #[test]
    fn suspicious_extension_matches_regardless_of_content() {
        let threat = detector().classify(&[], "evil.exe").unwrap();
        assert_eq!(threat.threat_type, "suspicious_extension");
        assert_eq!(threat.name, "Suspicious file extension: exe");
    }

    #[test]
    fn suspicious_extension_is_case_insensitive_but_reports_original_case() {
        let threat = detector().classify(b"harmless", "payload.EXE").unwrap();
        assert_eq!(threat.threat_type, "suspicious_extension");
        assert_eq!(threat.name, "Suspicious file extension: EXE");
    }

    #[test]
    fn extension_check_takes_precedence_over_signature() {
        // MZ header present, but .bat extension wins
        let threat = detector().classify(&[0x4D, 0x5A, 0x00], "run.bat").unwrap();
        assert_eq!(threat.threat_type, "suspicious_extension");
    }

    #[test]
    fn pe_signature_matches_anywhere_in_buffer() {
        let mut body = vec![0u8; 100];
        body[57] = 0x4D;
        body[58] = 0x5A;
        let threat = detector().classify(&body, "document.pdf").unwrap();
        assert_eq!(threat.threat_type, "executable");
        assert_eq!(threat.name, "PE Executable");
    }

    #[test]
    fn embedded_script_in_image_head() {
        let body = b"GIF89a ... <ScRiPt>alert(1)</script>";
        let threat = detector().classify(body, "photo.GIF").unwrap();
        assert_eq!(threat.threat_type, "embedded_script");
        assert_eq!(threat.name, "Embedded script detected in image");
    }

    #[test]
    fn embedded_script_past_scan_limit_is_ignored() {
        let mut body = vec![b' '; 10_100];
        body.extend_from_slice(b"<script>");
        assert!(detector().classify(&body, "photo.png").is_none());
    }

    #[test]
    fn embedded_script_check_only_applies_to_images() {
        assert!(detector().classify(b"<script>", "notes.txt").is_none());
    }

    #[test]
    fn javascript_url_in_svg_matches() {
        let threat = detector()
            .classify(b"<svg><a href=\"JAVASCRIPT:evil()\"/></svg>", "icon.svg")
            .unwrap();
        assert_eq!(threat.threat_type, "embedded_script");
    }

    #[test]
    fn clean_file_yields_no_match() {
        assert!(detector().classify(b"plain text content", "notes.txt").is_none());
        assert!(detector().classify(&[], "README").is_none());
    }

    #[test]
    fn filename_without_extension_never_matches_extension_check() {
        // "exe" without a dot is not a suspicious extension
        assert!(detector().classify(b"data", "exe").is_none());
    }

    #[test]
    fn custom_signatures_are_honored() {
        let custom = HeuristicDetector::with_signatures(vec![ThreatSignature {
            pattern: b"EICAR".to_vec(),
            name: "EICAR test file".to_string(),
            threat_type: "test_signature".to_string(),
        }]);
        let threat = custom.classify(b"xxEICARxx", "sample.bin").unwrap();
        assert_eq!(threat.threat_type, "test_signature");
        // The PE signature is not part of the custom set
        assert!(custom.classify(&[0x4D, 0x5A], "sample.bin").is_none());
    }
}
