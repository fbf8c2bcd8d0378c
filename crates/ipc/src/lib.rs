//! IPC message protocol for Loopwork
//!
//! Defines the messages exchanged between the rendering surface and the
//! stitch core, including the chart wire format.

pub mod error;
pub mod messages;
pub mod types;

pub use error::IpcError;
pub use messages::{CoreToSurface, SurfaceToCore};
pub use types::{CellRecord, ChartDocument, GeometryInfo, StitchRef};

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Encode a message as JSON
pub fn encode<T: Serialize>(message: &T) -> Result<String, IpcError> {
    serde_json::to_string(message).map_err(IpcError::Encode)
}

/// Decode a message from JSON
pub fn decode<T: DeserializeOwned>(json: &str) -> Result<T, IpcError> {
    if json.trim().is_empty() {
        return Err(IpcError::InvalidFormat("empty message".to_string()));
    }
    serde_json::from_str(json).map_err(IpcError::Decode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use loopwork_config::{Fidelity, Topology};

    #[test]
    fn test_chart_document_wire_format() {
        let doc = ChartDocument::from_json(
            r#"{"version":3,"cells":[
                {"row":0,"type":"sc"},
                {"row":1,"column":2,"type":"inc","modifiers":["blo"]}
            ]}"#,
        )
        .unwrap();

        assert_eq!(doc.version, 3);
        assert_eq!(doc.cells.len(), 2);
        assert_eq!(doc.cells[0].column, None);
        assert!(doc.cells[0].modifiers.is_empty());
        assert_eq!(doc.cells[1].stitch, "inc");
        assert_eq!(doc.cells[1].modifiers, vec!["blo".to_string()]);
    }

    #[test]
    fn test_message_tagging() {
        let json = encode(&SurfaceToCore::SetTopology {
            topology: Topology::Rectilinear,
        })
        .unwrap();
        assert_eq!(
            json,
            r#"{"type":"SetTopology","data":{"topology":"rectilinear"}}"#
        );

        let json = encode(&CoreToSurface::Disposed).unwrap();
        assert_eq!(json, r#"{"type":"Disposed"}"#);
    }

    #[test]
    fn test_message_round_trip() {
        let message = CoreToSurface::FidelityChanged {
            fidelity: Fidelity::High,
        };
        let decoded: CoreToSurface = decode(&encode(&message).unwrap()).unwrap();
        assert_eq!(decoded, message);
    }

    #[test]
    fn test_empty_and_malformed_input() {
        assert!(matches!(
            decode::<SurfaceToCore>("  "),
            Err(IpcError::InvalidFormat(_))
        ));
        assert!(matches!(
            decode::<SurfaceToCore>(r#"{"type":"Nope"}"#),
            Err(IpcError::Decode(_))
        ));

        let error = ChartDocument::from_json(r#"{"version":"one"}"#).unwrap_err();
        assert!(error.to_string().starts_with("Failed to decode message"));
    }
}
