//! Password-reset email templates
//!
//! Display strings are HTML-escaped in the HTML body. The reset URL is
//! inserted as given; callers check it with [`validate_reset_url`] before
//! rendering.

use chrono::{Datelike, Utc};
use url::Url;

pub const DEFAULT_SYSTEM_NAME: &str = "Attendance Monitoring System";
pub const DEFAULT_SCHOOL_NAME: &str = "Your School";

/// Values substituted into both templates
#[derive(Debug, Clone)]
pub struct ResetTemplate<'a> {
    pub first_name: &'a str,
    pub reset_url: &'a str,
    pub system_name: &'a str,
    pub school_name: &'a str,
    pub year: i32,
}

impl<'a> ResetTemplate<'a> {
    /// Build the template values for a recipient, stamped with the current year
    pub fn new(
        user_name: &'a str,
        reset_url: &'a str,
        system_name: Option<&'a str>,
        school_name: Option<&'a str>,
    ) -> Self {
        Self {
            first_name: first_name(user_name),
            reset_url,
            system_name: system_name.unwrap_or(DEFAULT_SYSTEM_NAME),
            school_name: school_name.unwrap_or(DEFAULT_SCHOOL_NAME),
            year: Utc::now().year(),
        }
    }

    pub fn subject(&self) -> String {
        format!("Reset Your Password - {}", self.system_name)
    }

    pub fn html(&self) -> String {
        let first_name = escape_html(self.first_name);
        let system_name = escape_html(self.system_name);
        let school_name = escape_html(self.school_name);
        let reset_url = self.reset_url;
        let year = self.year;

        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>Reset Your Password</title>
</head>
<body style="margin: 0; padding: 0; font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; background-color: #f4f4f5;">
  <table role="presentation" style="width: 100%; border-collapse: collapse;">
    <tr>
      <td align="center" style="padding: 40px 0;">
        <table role="presentation" style="width: 100%; max-width: 600px; border-collapse: collapse; background-color: #ffffff; border-radius: 12px; box-shadow: 0 4px 6px rgba(0, 0, 0, 0.1);">
          <!-- Header -->
          <tr>
            <td style="padding: 40px 40px 20px; text-align: center; background: linear-gradient(135deg, #6366f1 0%, #4f46e5 100%); border-radius: 12px 12px 0 0;">
              <h1 style="margin: 0; color: #ffffff; font-size: 24px; font-weight: 600;">
                🔐 Password Reset Request
              </h1>
              <p style="margin: 8px 0 0; color: rgba(255, 255, 255, 0.9); font-size: 14px;">
                {system_name} • {school_name}
              </p>
            </td>
          </tr>

          <!-- Body -->
          <tr>
            <td style="padding: 40px;">
              <p style="margin: 0 0 20px; color: #374151; font-size: 16px; line-height: 1.6;">
                Hi <strong>{first_name}</strong>,
              </p>
              <p style="margin: 0 0 20px; color: #374151; font-size: 16px; line-height: 1.6;">
                We received a request to reset your password. Click the button below to create a new password:
              </p>

              <!-- CTA Button -->
              <table role="presentation" style="width: 100%; border-collapse: collapse;">
                <tr>
                  <td align="center" style="padding: 20px 0;">
                    <a href="{reset_url}"
                       style="display: inline-block; padding: 16px 32px; background: linear-gradient(135deg, #6366f1 0%, #4f46e5 100%); color: #ffffff; text-decoration: none; font-size: 16px; font-weight: 600; border-radius: 8px; box-shadow: 0 4px 14px rgba(99, 102, 241, 0.4);">
                      Reset My Password
                    </a>
                  </td>
                </tr>
              </table>

              <!-- Security Notice -->
              <div style="margin: 30px 0; padding: 20px; background-color: #fef3c7; border-radius: 8px; border-left: 4px solid #f59e0b;">
                <p style="margin: 0; color: #92400e; font-size: 14px; line-height: 1.5;">
                  ⏰ <strong>This link expires in 1 hour</strong> for your security.<br>
                  If you didn't request this reset, you can safely ignore this email.
                </p>
              </div>

              <!-- Alternative Link -->
              <p style="margin: 20px 0 0; color: #6b7280; font-size: 14px; line-height: 1.6;">
                If the button doesn't work, copy and paste this link into your browser:
              </p>
              <p style="margin: 8px 0 0; padding: 12px; background-color: #f4f4f5; border-radius: 6px; word-break: break-all;">
                <a href="{reset_url}" style="color: #4f46e5; font-size: 12px; text-decoration: none;">
                  {reset_url}
                </a>
              </p>
            </td>
          </tr>

          <!-- Footer -->
          <tr>
            <td style="padding: 30px 40px; background-color: #f9fafb; border-radius: 0 0 12px 12px; border-top: 1px solid #e5e7eb;">
              <p style="margin: 0; color: #9ca3af; font-size: 12px; text-align: center; line-height: 1.5;">
                This is an automated message from {system_name}.<br>
                Please do not reply to this email.
              </p>
              <p style="margin: 16px 0 0; color: #9ca3af; font-size: 12px; text-align: center;">
                © {year} {school_name}. All rights reserved.
              </p>
            </td>
          </tr>
        </table>
      </td>
    </tr>
  </table>
</body>
</html>
"#
        )
    }

    pub fn text(&self) -> String {
        format!(
            "Hi {first_name},\n\
             \n\
             We received a request to reset your password for {system_name}.\n\
             \n\
             Click the link below to reset your password:\n\
             {reset_url}\n\
             \n\
             ⏰ This link expires in 1 hour for your security.\n\
             \n\
             If you didn't request this password reset, you can safely ignore this email.\n\
             \n\
             ---\n\
             This is an automated message. Please do not reply to this email.",
            first_name = self.first_name,
            system_name = self.system_name,
            reset_url = self.reset_url,
        )
    }
}

/// Accept only absolute http(s) URLs that can sit verbatim inside an HTML
/// attribute and a plain-text body
pub fn validate_reset_url(reset_url: &str) -> Result<(), String> {
    let url = Url::parse(reset_url).map_err(|_| "Invalid reset URL".to_string())?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err("Invalid reset URL".to_string());
    }

    let unsafe_char = reset_url
        .chars()
        .any(|c| {
            matches!(c, '"' | '\'' | '<' | '>' | '`') || c.is_whitespace() || c.is_control()
        });
    if unsafe_char {
        return Err("Invalid reset URL".to_string());
    }

    Ok(())
}

/// First whitespace-separated word of a display name
pub fn first_name(user_name: &str) -> &str {
    user_name.split_whitespace().next().unwrap_or_default()
}

/// Escape the characters HTML treats specially
pub fn escape_html(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#39;"),
            _ => result.push(c),
        }
    }
    result
}
