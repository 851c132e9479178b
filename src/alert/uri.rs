use crate::models::{AlertMessage, Channel};

/// Country calling code applied to national numbers.
pub const COUNTRY_CODE: &str = "91";

/// Short national emergency numbers that are dialled exactly as written.
pub const EMERGENCY_CODES: &[&str] = &["112", "100", "108", "102", "101", "1091", "1098"];

pub fn is_emergency_code(number: &str) -> bool {
    EMERGENCY_CODES.contains(&number)
}

/// Country code plus national number, digits only. `None` when the number
/// does not look like one of ours.
fn international_digits(number: &str) -> Option<String> {
    if number.len() == 10 {
        Some(format!("{}{}", COUNTRY_CODE, number))
    } else if number.len() > 10 && number.starts_with(COUNTRY_CODE) {
        Some(number.to_string())
    } else if number.len() > 10 && number.starts_with('0') {
        Some(format!("{}{}", COUNTRY_CODE, &number[1..]))
    } else {
        None
    }
}

/// International form with a leading `+`, as used by `tel:` and `sms:`.
pub fn international_number(number: &str) -> String {
    match international_digits(number) {
        Some(digits) => format!("+{}", digits),
        None => number.to_string(),
    }
}

/// International form without the `+`, as `wa.me` links expect.
pub fn whatsapp_number(number: &str) -> String {
    international_digits(number).unwrap_or_else(|| number.to_string())
}

/// Render `number` and `message` into the URI for `channel`.
///
/// `Call` ignores the message. `Sms` and `WhatsApp` percent-encode it into
/// the `body` and `text` parameters; without a message the parameter is left
/// off.
pub fn channel_uri(channel: Channel, number: &str, message: Option<&AlertMessage>) -> String {
    match channel {
        Channel::Call => {
            if is_emergency_code(number) {
                format!("tel:{}", number)
            } else {
                format!("tel:{}", international_number(number))
            }
        }
        Channel::Sms => {
            let target = format!("sms:{}", international_number(number));
            with_param(target, "body", message)
        }
        Channel::WhatsApp => {
            let target = format!("https://wa.me/{}", whatsapp_number(number));
            with_param(target, "text", message)
        }
    }
}

fn with_param(target: String, name: &str, message: Option<&AlertMessage>) -> String {
    match message {
        Some(message) => format!(
            "{}?{}={}",
            target,
            name,
            urlencoding::encode(message.as_str())
        ),
        None => target,
    }
}
