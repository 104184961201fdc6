use crate::src_loc::SrcLoc;
use annotate_snippets::{Level, Renderer};

#[derive(Debug, Copy, Clone, Eq, PartialEq, strum::Display)]
pub enum DiagnosticKind {
    /// A case pattern that is wider than the switch value and can never match.
    #[strum(serialize = "dead case")]
    DeadCase,
    /// A case defined after the default case, which can never be active.
    #[strum(serialize = "case after default")]
    CaseAfterDefault,
    /// A signed value used directly as a condition.
    #[strum(serialize = "signed condition")]
    SignedCondition,
    /// A domain name that is likely a mistake.
    #[strum(serialize = "suspicious domain name")]
    SuspiciousDomainName,
}

/// Advisory message about the hardware description. Never stops construction.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub title: String,
    pub src_loc: SrcLoc,
    pub footers: Vec<(Level, String)>,
}

#[derive(Debug, Copy, Clone)]
pub struct DiagnosticStringSettings {
    /// Include the source location that triggered the diagnostic as a footer.
    pub footer_location: bool,
}

impl Default for DiagnosticStringSettings {
    fn default() -> Self {
        DiagnosticStringSettings { footer_location: true }
    }
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, src_loc: SrcLoc, title: impl Into<String>) -> Diagnostic {
        Diagnostic {
            kind,
            title: title.into(),
            src_loc,
            footers: vec![],
        }
    }

    pub fn footer(mut self, level: Level, footer: impl Into<String>) -> Diagnostic {
        self.footers.push((level, footer.into()));
        self
    }

    pub fn to_string(&self, settings: DiagnosticStringSettings) -> String {
        let Diagnostic {
            kind,
            title,
            src_loc,
            footers,
        } = self;

        let title = format!("{}: {}", kind, title);
        let location = format!("at {}", src_loc);

        let mut message = Level::Warning.title(&title);
        if settings.footer_location {
            message = message.footer(Level::Note.title(&location));
        }
        for &(level, ref footer) in footers {
            message = message.footer(level.title(footer));
        }

        let rendered = Renderer::plain().render(message).to_string();
        rendered
    }
}

/// Collects advisory diagnostics, in the order they were reported.
#[derive(Debug, Default)]
pub struct Diagnostics {
    diagnostics: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Diagnostics { diagnostics: vec![] }
    }

    pub fn report(&mut self, diag: Diagnostic) {
        log::warn!("{}: {} (at {})", diag.kind, diag.title, diag.src_loc);
        self.diagnostics.push(diag);
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn finish(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

#[cfg(test)]
mod test {
    use crate::diagnostic::{Diagnostic, DiagnosticKind, DiagnosticStringSettings, Diagnostics};
    use crate::src_loc::SrcLoc;
    use annotate_snippets::Level;

    #[test]
    fn render_includes_title_location_and_footers() {
        let src_loc = SrcLoc {
            file: "design.rs",
            line: 12,
            column: 5,
        };
        let diag = Diagnostic::new(DiagnosticKind::DeadCase, src_loc, "pattern is too wide")
            .footer(Level::Help, "remove this case");

        let full = diag.to_string(DiagnosticStringSettings::default());
        assert!(full.contains("dead case: pattern is too wide"));
        assert!(full.contains("design.rs:12:5"));
        assert!(full.contains("remove this case"));

        let short = diag.to_string(DiagnosticStringSettings { footer_location: false });
        assert!(!short.contains("design.rs:12:5"));
    }

    #[test]
    fn sink_keeps_report_order() {
        let mut diags = Diagnostics::new();
        let src_loc = SrcLoc::caller();
        diags.report(Diagnostic::new(DiagnosticKind::SignedCondition, src_loc, "first"));
        diags.report(Diagnostic::new(DiagnosticKind::CaseAfterDefault, src_loc, "second"));
        let kinds: Vec<DiagnosticKind> = diags.finish().iter().map(|d| d.kind).collect();
        assert_eq!(kinds, vec![DiagnosticKind::SignedCondition, DiagnosticKind::CaseAfterDefault]);
    }
}
