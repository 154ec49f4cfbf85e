use quick_xml::escape::escape;
use routetrace_core::VisitRecord;

/// Popup content attached to a marker. Text is stored raw and escaped only
/// when rendered to markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Popup {
    pub title: String,
    pub lines: Vec<String>,
}

impl Popup {
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            lines: Vec::new(),
        }
    }

    #[must_use]
    pub fn line(mut self, line: impl Into<String>) -> Self {
        self.lines.push(line.into());
        self
    }

    /// Shop name as the title, then check-in, check-out and duration.
    #[must_use]
    pub fn for_visit(record: &VisitRecord) -> Self {
        let check_in = match record.check_in_at {
            Some(at) => format!("{at} ({})", record.check_in),
            None => record.check_in.to_string(),
        };
        let check_out = match record.check_out_at {
            Some(at) => format!("{at} ({})", record.check_out),
            None => record.check_out.to_string(),
        };
        Self::new(record.shop.clone())
            .line(format!("Check-in: {check_in}"))
            .line(format!("Check-out: {check_out}"))
            .line(format!("Duration: {} min", record.duration_min))
    }

    /// Escaped HTML fragment: bold title followed by `<br>`-separated lines.
    #[must_use]
    pub fn to_html(&self) -> String {
        let mut html = format!("<b>{}</b>", escape(self.title.as_str()));
        for line in &self.lines {
            html.push_str("<br>");
            html.push_str(&escape(line.as_str()));
        }
        html
    }
}
