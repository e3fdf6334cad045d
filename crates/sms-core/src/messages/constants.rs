//! Message type, direction and data coding constants

/// Plain text message
pub const MSG_TYPE_TEXT: &str = "text";
/// WAP service indication
pub const MSG_TYPE_WSI: &str = "wsi";
/// Gateway response to a submission
pub const MSG_TYPE_RESPONSE: &str = "response";
/// Delivery receipt
pub const MSG_TYPE_DLR: &str = "dlr";

pub const DIRECTION_MO: &str = "MO";
pub const DIRECTION_MT: &str = "MT";
pub const DIRECTION_MT_PUSH: &str = "MT-PUSH";

/// GSM 03.38 default alphabet
pub const DSC_GSM: &str = "GSM";
/// UCS-2
pub const DSC_UCS: &str = "UCS";
pub const DSC_BINARY: &str = "BINARY";

/// Status marker for accepted submissions and successful forwards
pub const STATUS_SUCCESS: &str = "success";
/// Status marker for rejected submissions
pub const STATUS_ERROR: &str = "error";
