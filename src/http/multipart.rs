/// An uploaded file held in memory so it can be sent more than once.
#[derive(Debug, Clone, PartialEq)]
pub struct FilePart {
    pub(crate) file_name: String,
    pub(crate) mime_type: Option<String>,
    pub(crate) bytes: Vec<u8>,
}

impl FilePart {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: None,
            bytes: bytes.into(),
        }
    }

    pub fn mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Part {
    Text(String),
    File(FilePart),
}

/// An ordered `multipart/form-data` body. Parts are owned, the transport
/// rebuilds its own form from them on every send.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MultipartForm {
    parts: Vec<(String, Part)>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push((name.into(), Part::Text(value.into())));
        self
    }

    /// Appends the field only when a non-empty value is given.
    pub fn text_opt<S: AsRef<str>>(self, name: impl Into<String>, value: Option<S>) -> Self {
        match value {
            Some(v) if !v.as_ref().is_empty() => self.text(name, v.as_ref()),
            _ => self,
        }
    }

    pub fn file(mut self, name: impl Into<String>, file: FilePart) -> Self {
        self.parts.push((name.into(), Part::File(file)));
        self
    }

    pub fn file_opt(self, name: impl Into<String>, file: Option<FilePart>) -> Self {
        match file {
            Some(f) => self.file(name, f),
            None => self,
        }
    }

    pub fn parts(&self) -> &[(String, Part)] {
        &self.parts
    }

    pub fn get_text(&self, name: &str) -> Option<&str> {
        self.parts.iter().find_map(|(n, p)| match p {
            Part::Text(t) if n == name => Some(t.as_str()),
            _ => None,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_parts_are_skipped() {
        let form = MultipartForm::new()
            .text("phone_number", "0770")
            .text_opt("about", Some(""))
            .text_opt::<&str>("title", None)
            .file_opt("idcard_front", None)
            .file("profile_image", FilePart::new("me.png", vec![1, 2, 3]).mime_type("image/png"));

        assert_eq!(form.parts().len(), 2);
        assert_eq!(form.get_text("phone_number"), Some("0770"));
        assert_eq!(form.get_text("about"), None);
    }
}
