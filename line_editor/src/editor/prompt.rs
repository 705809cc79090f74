// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Prompts, with optional `%` formatting directives.
//!
//! | Directive   | Effect              |
//! |-------------|---------------------|
//! | `%B` / `%b` | bold on / off       |
//! | `%U` / `%u` | underline on / off  |
//! | `%S` / `%s` | standout on / off   |
//! | `%P` / `%p` | blink on / off      |
//! | `%V` / `%v` | reverse on / off    |
//! | `%D` / `%d` | dim on / off        |
//! | `%%`        | a literal `%`       |
//!
//! Terminals can only turn every attribute off at once, so switching one off resets
//! all of them and turns the remaining ones back on.

use crate::{Capability, ControlStrings, TextAttribute, str_display_width};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PromptStyle {
    /// The prompt is written exactly as given.
    #[default]
    Literal,
    /// `%` directives are interpreted. See the module docs.
    Format,
}

/// A prompt ready to be written: the bytes to send and the columns they take.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Prompt {
    pub text: String,
    pub style: PromptStyle,
    pub rendered: Vec<u8>,
    pub width: usize,
    /// The visible characters, used to re-print prompt cells on terminals that can't
    /// move the cursor right.
    pub plain: String,
}

fn directive_attribute(directive: char) -> Option<(TextAttribute, bool)> {
    let attribute = match directive.to_ascii_uppercase() {
        'B' => TextAttribute::Bold,
        'U' => TextAttribute::Underline,
        'S' => TextAttribute::Standout,
        'P' => TextAttribute::Blink,
        'V' => TextAttribute::Reverse,
        'D' => TextAttribute::Dim,
        _ => return None,
    };
    Some((attribute, directive.is_ascii_uppercase()))
}

impl Prompt {
    #[must_use]
    pub fn new(text: &str, style: PromptStyle, control_strings: &ControlStrings) -> Self {
        match style {
            PromptStyle::Literal => Self {
                text: text.to_owned(),
                style,
                rendered: text.as_bytes().to_vec(),
                width: str_display_width(text),
                plain: String::from_utf8_lossy(&strip_ansi_escapes::strip(text.as_bytes()))
                    .into_owned(),
            },
            PromptStyle::Format => Self::format(text, control_strings),
        }
    }

    fn format(text: &str, control_strings: &ControlStrings) -> Self {
        let mut rendered = Vec::with_capacity(text.len());
        let mut plain = String::with_capacity(text.len());
        let mut active: Vec<TextAttribute> = vec![];

        let mut chars = text.chars().peekable();
        while let Some(it) = chars.next() {
            if it != '%' {
                push_char(&mut rendered, &mut plain, it);
                continue;
            }
            let Some(&directive) = chars.peek() else {
                push_char(&mut rendered, &mut plain, it);
                break;
            };
            chars.next();
            match directive_attribute(directive) {
                _ if directive == '%' => push_char(&mut rendered, &mut plain, '%'),
                Some((attribute, true)) => {
                    if !active.contains(&attribute) {
                        active.push(attribute);
                        rendered.extend_from_slice(control_strings.attribute(attribute));
                    }
                }
                Some((attribute, false)) => {
                    if active.contains(&attribute) {
                        active.retain(|it| *it != attribute);
                        rendered.extend_from_slice(control_strings.get(Capability::AttributesOff));
                        for remaining in &active {
                            rendered.extend_from_slice(control_strings.attribute(*remaining));
                        }
                    }
                }
                None => {
                    push_char(&mut rendered, &mut plain, '%');
                    push_char(&mut rendered, &mut plain, directive);
                }
            }
        }
        if !active.is_empty() {
            rendered.extend_from_slice(control_strings.get(Capability::AttributesOff));
        }

        Self {
            text: text.to_owned(),
            style: PromptStyle::Format,
            width: str_display_width(&plain),
            rendered,
            plain,
        }
    }
}

fn push_char(rendered: &mut Vec<u8>, plain: &mut String, it: char) {
    let mut utf8 = [0; 4];
    rendered.extend_from_slice(it.encode_utf8(&mut utf8).as_bytes());
    plain.push(it);
}
