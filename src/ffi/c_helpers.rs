//! Conventions for the C API's integer returns.
//!
//! The C API encodes three different things as `c_int` depending on the
//! function family: a result code (0 is success), a presence flag (non-zero
//! means present), and a verification outcome (1 means passed). Keeping the
//! decodings in one place avoids re-deriving the convention at every call
//! site.

use std::os::raw::c_int;

/// Result-code convention: 0 is success.
pub fn success(result: c_int) -> bool {
    result == 0
}

/// Presence/boolean convention: non-zero is true.
pub fn present(result: c_int) -> bool {
    result != 0
}

/// Script verification convention: exactly 1 is a pass.
pub fn verification_passed(result: c_int) -> bool {
    result == 1
}

pub fn to_c_bool(value: bool) -> c_int {
    if value {
        1
    } else {
        0
    }
}

/// Write-callback convention: 0 continues the serialization, non-zero
/// aborts it.
pub fn to_c_result(result: bool) -> c_int {
    if result {
        0
    } else {
        1
    }
}

/// Decodes a length-delimited byte span handed across the C boundary into an
/// owned string, replacing invalid UTF-8 rather than failing. Returns an
/// empty string for a null span.
///
/// # Safety
/// If `ptr` is non-null it must point to `len` readable bytes.
pub unsafe fn cast_string(ptr: *const std::os::raw::c_char, len: usize) -> String {
    if ptr.is_null() {
        return String::new();
    }
    let bytes = std::slice::from_raw_parts(ptr as *const u8, len);
    String::from_utf8_lossy(bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_code_convention() {
        assert!(success(0));
        assert!(!success(1));
        assert!(!success(-1));
    }

    #[test]
    fn test_presence_convention() {
        assert!(present(1));
        assert!(present(-1));
        assert!(!present(0));
    }

    #[test]
    fn test_verification_convention() {
        assert!(verification_passed(1));
        assert!(!verification_passed(0));
        assert!(!verification_passed(2));
    }

    #[test]
    fn test_bool_round_trips() {
        assert_eq!(to_c_bool(true), 1);
        assert_eq!(to_c_bool(false), 0);
        assert_eq!(to_c_result(true), 0);
        assert_eq!(to_c_result(false), 1);
    }

    #[test]
    fn test_cast_string() {
        let s = b"hello";
        let out = unsafe { cast_string(s.as_ptr() as *const _, s.len()) };
        assert_eq!(out, "hello");
        assert_eq!(unsafe { cast_string(std::ptr::null(), 5) }, "");

        let bad = [0x66u8, 0xff, 0x6f];
        let out = unsafe { cast_string(bad.as_ptr() as *const _, bad.len()) };
        assert_eq!(out, "f\u{fffd}o");
    }
}
