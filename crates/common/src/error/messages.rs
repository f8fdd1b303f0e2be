//! User-facing error text
//!
//! The table below is data shared with the existing UI; keep the strings
//! byte-for-byte identical when editing.

/// Detail attached to a request that hit the per-attempt timeout.
pub const TIMEOUT_DETAIL: &str = "Yêu cầu đã hết thời gian chờ";

/// Detail attached to a request that never reached the server.
pub const NETWORK_DETAIL: &str = "Không thể kết nối tới máy chủ";

/// Fallback when neither the status table nor the error detail has text.
pub const GENERIC_MESSAGE: &str = "Đã xảy ra lỗi, vui lòng thử lại";

/// Shown for faults inside the client, whose detail is meant for developers.
pub const UNKNOWN_MESSAGE: &str = "Đã xảy ra lỗi không xác định";

/// Localized message for a status code, if the status has a fixed entry.
pub fn status_message(status: u16) -> Option<&'static str> {
    let message = match status {
        400 => "Dữ liệu không hợp lệ",
        401 => "Phiên đăng nhập đã hết hạn",
        403 => "Bạn không có quyền truy cập",
        404 => "Không tìm thấy dữ liệu",
        409 => "Dữ liệu đã tồn tại hoặc xung đột",
        422 => "Dữ liệu không thể xử lý",
        429 => "Quá nhiều yêu cầu, vui lòng thử lại sau",
        500 => "Lỗi máy chủ, vui lòng thử lại sau",
        502 | 503 | 504 => "Dịch vụ tạm thời không khả dụng",
        0 => NETWORK_DETAIL,
        _ => return None,
    };
    Some(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_statuses_share_one_message() {
        assert_eq!(status_message(502), status_message(503));
        assert_eq!(status_message(503), status_message(504));
    }

    #[test]
    fn unknown_statuses_have_no_entry() {
        assert_eq!(status_message(418), None);
        assert_eq!(status_message(501), None);
        assert_eq!(status_message(200), None);
    }
}
