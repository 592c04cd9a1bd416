use std::{error, fmt};

use actix_web_flash_messages::IncomingFlashMessages;

/// Provide a representation for any type that implements `Error`
pub fn error_chain_fmt(e: &impl error::Error, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "{e}\n")?;

    let mut current = e.source();
    while let Some(cause) = current {
        writeln!(f, "Caused by:\n\t{cause}")?;
        current = cause.source();
    }

    Ok(())
}

/// Render incoming flash messages as HTML paragraphs
pub fn flash_messages_html(flash_messages: &IncomingFlashMessages) -> String {
    flash_messages
        .iter()
        .map(|m| format!("<p><i>{}</i></p>\n", htmlescape::encode_minimal(m.content())))
        .collect()
}
