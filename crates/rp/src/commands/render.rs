//! `rp render` command implementation.

use std::path::PathBuf;

use clap::Args;
use rp_config::{CliSettings, Config, ImagesConfig, ReportConfig};
use rp_image::{ImageModule, ImageSize};
use rp_package::ZipPackage;
use rp_template::{RenderContext, RenderReport, TemplateRenderer, Value};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Template package (overrides config).
    #[arg(short, long)]
    template: Option<PathBuf>,

    /// Output package path (overrides config).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// JSON file with placeholder values (overrides config).
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Bind an image file to a placeholder name. Repeatable.
    #[arg(short, long = "image", value_name = "NAME=PATH", value_parser = parse_binding)]
    images: Vec<(String, PathBuf)>,

    /// Path to configuration file (default: auto-discover rp.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose output (show skipped placeholders).
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl RenderArgs {
    /// Execute the render command.
    ///
    /// # Errors
    ///
    /// Returns an error if the template can't be loaded or rendered, or the
    /// output can't be written.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            template: self.template,
            output: self.output,
            data: self.data,
            images: self.images,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        let template = config.require_template()?;
        let out_path = config.require_output()?;
        output.info(&format!("Rendering {}...", template.display()));

        let report = render_report(&config)?;
        print_report(&output, &report, &out_path.display().to_string());
        Ok(())
    }
}

/// Render the configured template and save the result.
pub(crate) fn render_report(config: &Config) -> Result<RenderReport, CliError> {
    let template = config.require_template()?;
    let out_path = config.require_output()?;

    let ctx = build_context(&config.report_resolved)?;
    let mut package = ZipPackage::open(template)?;
    let mut renderer = TemplateRenderer::new().with_module(image_module(&config.images));
    let report = renderer.render_package(&mut package, &ctx)?;

    if let Some(parent) = out_path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    package.save(out_path)?;
    tracing::info!(output = %out_path.display(), "Report written");
    Ok(report)
}

/// Build the render context from the data file and image bindings.
fn build_context(report: &ReportConfig) -> Result<RenderContext, CliError> {
    let mut ctx = match &report.data {
        Some(path) => {
            let text = std::fs::read_to_string(path)?;
            let json: serde_json::Value = serde_json::from_str(&text)?;
            if !json.is_object() {
                return Err(CliError::Validation(format!(
                    "{} must contain a JSON object",
                    path.display()
                )));
            }
            RenderContext::from_json(json)
        }
        None => RenderContext::new(),
    };

    for (name, path) in &report.images {
        let bytes = std::fs::read(path).map_err(|e| {
            CliError::Validation(format!("cannot read image {}: {e}", path.display()))
        })?;
        ctx.insert(name.clone(), Value::Bytes(bytes));
    }
    Ok(ctx)
}

fn image_module(images: &ImagesConfig) -> ImageModule {
    let mut builder = ImageModule::builder()
        .marker(images.marker_char())
        .default_size(ImageSize::new(images.default_width, images.default_height));
    if images.size_from_header {
        builder = builder.size_from_header();
    }
    if let Some(max_width) = images.max_width {
        builder = builder.max_width(max_width);
    }
    builder.build()
}

/// Parse a `NAME=PATH` image binding.
fn parse_binding(arg: &str) -> Result<(String, PathBuf), String> {
    let (name, path) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=PATH, got {arg:?}"))?;
    let name = name.trim();
    if name.is_empty() || path.is_empty() {
        return Err(format!("expected NAME=PATH, got {arg:?}"));
    }
    Ok((name.to_owned(), PathBuf::from(path)))
}

fn print_report(output: &Output, report: &RenderReport, out_path: &str) {
    output.field("Parts", &report.parts.join(", "));
    output.field("Placeholders", &report.tags.to_string());
    output.field(
        "Images",
        &format!(
            "{} embedded, {} left blank",
            report.module_fragments,
            report.module_tags - report.module_fragments
        ),
    );

    if !report.warnings.is_empty() {
        output.warning(&format!("\nWarnings ({}):", report.warnings.len()));
        for warning in &report.warnings {
            output.warning(&format!("  {warning}"));
        }
    }

    output.success(&format!("\nWrote {out_path}"));
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rp_package::{CONTENT_TYPES_PART, Package};
    use rp_template::MAIN_DOCUMENT_PART;

    use super::*;

    const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/></Types>"#;
    const DOCUMENT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#;
    const DOCUMENT: &str = r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p><w:r><w:t>{title}: {%chart} {%missing}</w:t></w:r></w:p></w:body></w:document>"#;

    fn write_template(path: &std::path::Path) {
        let mut package = ZipPackage::default();
        package
            .write_part(CONTENT_TYPES_PART, CONTENT_TYPES.as_bytes().to_vec())
            .unwrap();
        package
            .write_part(MAIN_DOCUMENT_PART, DOCUMENT.as_bytes().to_vec())
            .unwrap();
        package
            .write_part(
                "word/_rels/document.xml.rels",
                DOCUMENT_RELS.as_bytes().to_vec(),
            )
            .unwrap();
        package.save(path).unwrap();
    }

    #[test]
    fn test_parse_binding() {
        assert_eq!(
            parse_binding("chart=out/q3.png").unwrap(),
            ("chart".to_owned(), PathBuf::from("out/q3.png"))
        );
        assert_eq!(
            parse_binding("chart=a=b.png").unwrap().1,
            PathBuf::from("a=b.png")
        );
        assert!(parse_binding("chart").is_err());
        assert!(parse_binding("=x.png").is_err());
        assert!(parse_binding("chart=").is_err());
    }

    #[test]
    fn test_build_context_from_data_and_images() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("data.json");
        let chart = dir.path().join("chart.bin");
        std::fs::write(&data, r#"{"title": "Q3", "teacher": {"name": "Ada"}}"#).unwrap();
        std::fs::write(&chart, [1u8, 2, 3]).unwrap();

        let report = ReportConfig {
            data: Some(data),
            images: [("chart".to_owned(), chart)].into_iter().collect(),
            ..Default::default()
        };
        let ctx = build_context(&report).unwrap();

        assert_eq!(ctx.resolve("title").unwrap(), Some(&Value::from("Q3")));
        assert_eq!(ctx.resolve("teacher.name").unwrap(), Some(&Value::from("Ada")));
        assert_eq!(ctx.resolve("chart").unwrap(), Some(&Value::Bytes(vec![1, 2, 3])));
    }

    #[test]
    fn test_build_context_rejects_non_object_data() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("data.json");
        std::fs::write(&data, "[1, 2]").unwrap();

        let report = ReportConfig {
            data: Some(data),
            ..Default::default()
        };
        assert!(matches!(
            build_context(&report),
            Err(CliError::Validation(_))
        ));
    }

    #[test]
    fn test_build_context_missing_image_file() {
        let report = ReportConfig {
            images: [("chart".to_owned(), PathBuf::from("/nonexistent/chart.png"))]
                .into_iter()
                .collect(),
            ..Default::default()
        };
        let err = build_context(&report).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/chart.png"));
    }

    #[test]
    fn test_render_report_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("template.docx");
        let chart = dir.path().join("chart.png");
        let data = dir.path().join("data.json");
        let config_path = dir.path().join("rp.toml");
        write_template(&template);
        let mut png = std::io::Cursor::new(Vec::new());
        image::RgbaImage::new(4, 3)
            .write_to(&mut png, image::ImageFormat::Png)
            .unwrap();
        std::fs::write(&chart, png.into_inner()).unwrap();
        std::fs::write(&data, r#"{"title": "Quarterly"}"#).unwrap();
        std::fs::write(
            &config_path,
            r#"
[report]
template = "template.docx"
output = "out/report.docx"
data = "data.json"

[images]
size_from_header = false
"#,
        )
        .unwrap();

        let settings = CliSettings {
            images: vec![("chart".to_owned(), chart)],
            ..Default::default()
        };
        let config = Config::load(Some(&config_path), Some(&settings)).unwrap();
        let report = render_report(&config).unwrap();

        assert_eq!(report.tags, 3);
        assert_eq!(report.module_tags, 2);
        assert_eq!(report.module_fragments, 1);

        let rendered = ZipPackage::open(&dir.path().join("out/report.docx")).unwrap();
        let xml = rendered.read_text(MAIN_DOCUMENT_PART).unwrap();
        assert!(xml.contains("Quarterly: </w:t><w:drawing "));
        assert!(rendered.contains("word/media/image_rp2.png"));
        assert_eq!(
            rendered
                .relationships("word/_rels/document.xml.rels")
                .unwrap()
                .len(),
            2
        );
    }
}
