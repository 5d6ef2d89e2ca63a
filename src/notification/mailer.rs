use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use super::models::EmailJob;
use crate::config::SmtpConfig;

/// Thin wrapper around an async SMTP transport with a fixed sender.
#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> Result<Self, String> {
        let creds = Credentials::new(config.username.clone(), config.password.clone());

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
            .map_err(|e| format!("Failed to create SMTP transport: {}", e))?
            .credentials(creds)
            .build();

        let from = Mailbox::new(
            Some(config.from_name.clone()),
            config
                .from_email
                .parse()
                .map_err(|e| format!("Failed to parse sender email: {}", e))?,
        );

        Ok(SmtpMailer { transport, from })
    }

    pub async fn send(&self, job: &EmailJob) -> Result<(), String> {
        let email = Message::builder()
            .from(self.from.clone())
            .to(Mailbox::new(
                Some(job.recipient_name.clone()),
                job.recipient_email
                    .parse()
                    .map_err(|e| format!("Failed to parse receiver email: {}", e))?,
            ))
            .subject(&job.subject)
            .header(ContentType::TEXT_HTML)
            .body(job.body.clone())
            .map_err(|e| format!("Failed to build a message: {}", e))?;

        self.transport
            .send(email)
            .await
            .map_err(|e| format!("Failed to send an email: {}", e))?;

        Ok(())
    }
}

/// Renders the notification e-mail body. All user-supplied text is escaped.
pub fn render_body(recipient_name: &str, title: &str, message: &str) -> String {
    format!(
        "<html><body>\
         <h2>{}</h2>\
         <p>Hi {},</p>\
         <p>{}</p>\
         <p>Thank you for choosing us.</p>\
         </body></html>",
        html_escape(title),
        html_escape(recipient_name),
        html_escape(message)
    )
}

fn html_escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_html_metacharacters() {
        assert_eq!(
            html_escape("<script>alert('x')</script>"),
            "&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;"
        );
        assert_eq!(html_escape("a & b"), "a &amp; b");
        assert_eq!(html_escape("plain text"), "plain text");
    }

    #[test]
    fn body_contains_escaped_user_text() {
        let body = render_body("Ada", "Order Placed", "Your <b>suit</b> order is in");
        assert!(body.contains("<h2>Order Placed</h2>"));
        assert!(body.contains("Hi Ada,"));
        assert!(body.contains("Your &lt;b&gt;suit&lt;/b&gt; order is in"));
    }
}
