use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use rmcp::{
    ServerHandler, ServiceExt,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{ServerCapabilities, ServerInfo},
    schemars, tool, tool_handler, tool_router,
};
use serde::{Deserialize, Serialize};

use crate::extract::{ExtractError, ExtractionResult, Extractor};
use crate::pdf::{PageSource, PdfDocument};

// Request structs for tools

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PathRequest {
    #[schemars(description = "Path to the PDF file")]
    pub path: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PdfReadPagesRequest {
    #[schemars(description = "Path to the PDF file")]
    pub path: String,
    #[schemars(description = "Page spec, comma-separated pages and ranges (e.g., '1,3-5,8')")]
    pub pages: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PdfExtractTextRequest {
    #[schemars(description = "Original file name of the upload; must end in .pdf")]
    pub filename: String,
    #[schemars(description = "The PDF file contents, base64-encoded")]
    pub content_base64: String,
    #[schemars(description = "Page spec, comma-separated pages and ranges (e.g., '1,3-5,8')")]
    pub pages: String,
}

#[derive(Clone)]
pub struct PdfServer {
    extractor: Arc<Extractor>,
    tool_router: ToolRouter<Self>,
}

impl PdfServer {
    pub fn new(extractor: Extractor) -> Self {
        Self {
            extractor: Arc::new(extractor),
            tool_router: Self::tool_router(),
        }
    }
}

#[tool_router]
impl PdfServer {
    #[tool(description = "Get the number of pages in a PDF")]
    fn pdf_page_count(&self, Parameters(PathRequest { path }): Parameters<PathRequest>) -> String {
        match PdfDocument::open(&path) {
            Ok(doc) => {
                let result = PageCountResult {
                    page_count: doc.page_count(),
                    path,
                };
                to_json(&result)
            }
            Err(e) => error_json(500, format!("failed to open PDF: {}", e)),
        }
    }

    #[tool(description = "Extract text content from specific pages of a PDF on disk. Use page spec syntax like '1,3-5,8'; pages past the end of the document are skipped.")]
    fn pdf_read_pages(&self, Parameters(req): Parameters<PdfReadPagesRequest>) -> String {
        let path = Path::new(&req.path);
        let bytes = match std::fs::read(path) {
            Ok(b) => b,
            Err(e) => return error_json(400, format!("Failed to read PDF: {}: {}", req.path, e)),
        };
        let filename = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or_default();

        respond(self.extractor.extract(&bytes, filename, &req.pages))
    }

    #[tool(description = "Extract text content from specific pages of an uploaded PDF. The file is passed base64-encoded along with its file name and a page spec like '1,3-5,8'.")]
    fn pdf_extract_text(&self, Parameters(req): Parameters<PdfExtractTextRequest>) -> String {
        let bytes = match STANDARD.decode(req.content_base64.trim()) {
            Ok(b) => b,
            Err(e) => return error_json(400, format!("invalid base64 content: {}", e)),
        };

        respond(self.extractor.extract(&bytes, &req.filename, &req.pages))
    }
}

// Result types for MCP tools

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct PageCountResult {
    pub path: String,
    pub page_count: u32,
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ErrorResult {
    pub status: u16,
    pub detail: String,
}

fn respond(outcome: Result<ExtractionResult, ExtractError>) -> String {
    match outcome {
        Ok(result) => to_json(&result),
        Err(e) => {
            if e.is_client_error() {
                tracing::info!(status = e.status(), error = %e, "extraction rejected");
            } else {
                tracing::error!(status = e.status(), error = %e, "extraction failed");
            }
            error_json(e.status(), e.to_string())
        }
    }
}

fn error_json(status: u16, detail: String) -> String {
    to_json(&ErrorResult { status, detail })
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("Error: {}", e))
}

#[tool_handler]
impl ServerHandler for PdfServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "PDF page text extraction. Use pdf_page_count to learn how many pages a PDF has, \
                 pdf_read_pages to extract text from pages of a PDF on disk, and pdf_extract_text \
                 to extract text from an uploaded (base64) PDF. Pages are selected with a spec \
                 like '1,3-5,8'. Blank pages produce a warning suggesting OCR."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

pub async fn run_server(extractor: Extractor) -> Result<()> {
    let server = PdfServer::new(extractor);
    tracing::info!("MCP server listening on stdio");

    // Serve using stdin/stdout as a tuple
    let service = server.serve((tokio::io::stdin(), tokio::io::stdout())).await?;

    service.waiting().await?;

    Ok(())
}
