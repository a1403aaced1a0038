//! Outbound message composition.

use super::types::{ContactRequest, OutboundMessage};

/// Subject line for mail relayed from `website`.
pub fn subject_for(website: &str) -> String {
    format!("Mail from {website} website")
}

/// Render the plain text body.
///
/// Name, message and phone segments render empty when the value is empty.
fn render_body(request: &ContactRequest) -> String {
    let name_text = optional_line("name", &request.name);
    let message_text = optional_line("message", &request.message);
    let phone_text = optional_line(
        "Phone Number",
        request.phone_number.as_deref().unwrap_or_default(),
    );

    format!(
        "\n Mail obtained from {website} website \n Sender's Detail \n  {name_text} , \n email : {email},\n {message_text}  \n {phone_text}",
        website = request.website,
        email = request.email,
    )
}

fn optional_line(label: &str, value: &str) -> String {
    if value.is_empty() {
        String::new()
    } else {
        format!("\n {label} : {value}")
    }
}

/// Build the mail for a validated request.
///
/// Pure; replies are directed at the sender.
pub fn compose(request: ContactRequest, from: &str) -> OutboundMessage {
    let subject = subject_for(&request.website);
    let body = render_body(&request);

    OutboundMessage {
        from: from.to_string(),
        reply_to: Some(request.email),
        to: request.destination,
        subject,
        body,
        attachments: request.attachments,
    }
}
