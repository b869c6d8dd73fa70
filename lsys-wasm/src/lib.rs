use lsys_core::error::{CompilerError, Severity};
use lsys_core::{compile_source, realize, InstanceBatch, Overrides, RealizeOptions};
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub struct LSystemBuild {
    diagnostics: String,
    has_error: bool,
    constants_json: String,
    main_iterations: usize,
    subtree_iterations: usize,
    batches: Vec<InstanceBatch>,
}

#[wasm_bindgen]
impl LSystemBuild {
    #[wasm_bindgen(getter)]
    pub fn diagnostics(&self) -> String {
        self.diagnostics.clone()
    }

    #[wasm_bindgen(getter, js_name = hasError)]
    pub fn has_error(&self) -> bool {
        self.has_error
    }

    #[wasm_bindgen(getter, js_name = constantsJson)]
    pub fn constants_json(&self) -> String {
        self.constants_json.clone()
    }

    #[wasm_bindgen(getter, js_name = mainIterations)]
    pub fn main_iterations(&self) -> usize {
        self.main_iterations
    }

    #[wasm_bindgen(getter, js_name = subtreeIterations)]
    pub fn subtree_iterations(&self) -> usize {
        self.subtree_iterations
    }

    #[wasm_bindgen(getter, js_name = batchCount)]
    pub fn batch_count(&self) -> usize {
        self.batches.len()
    }

    /// Symbol name of batch `i`, empty when out of range.
    pub fn symbol(&self, i: usize) -> String {
        self.batches
            .get(i)
            .map(|b| b.symbol.clone())
            .unwrap_or_default()
    }

    /// Column-major 4x4 subtree transforms of batch `i`, 16 floats each.
    #[wasm_bindgen(js_name = localTransforms)]
    pub fn local_transforms(&self, i: usize) -> Vec<f32> {
        self.batches
            .get(i)
            .map(|b| b.local.clone())
            .unwrap_or_default()
    }

    /// Column-major 4x4 anchor transforms of batch `i`, 16 floats each.
    pub fn anchors(&self, i: usize) -> Vec<f32> {
        self.batches
            .get(i)
            .map(|b| b.anchors.clone())
            .unwrap_or_default()
    }
}

impl LSystemBuild {
    fn failed(diagnostics: String) -> Self {
        Self {
            diagnostics,
            has_error: true,
            constants_json: "[]".to_owned(),
            main_iterations: 0,
            subtree_iterations: 0,
            batches: Vec::new(),
        }
    }
}

#[wasm_bindgen]
pub fn build_lsystem(
    source: &str,
    overrides_json: &str,
    draw_budget: u32,
    max_iterations: u32,
    subtree_iterations: u32,
) -> LSystemBuild {
    let options = RealizeOptions {
        draw_budget: u64::from(draw_budget),
        max_iterations: max_iterations as usize,
        subtree_iterations: subtree_iterations as usize,
    };
    build_program(source, overrides_json, &options)
}

fn build_program(source: &str, overrides_json: &str, options: &RealizeOptions) -> LSystemBuild {
    let overrides = match parse_overrides(overrides_json) {
        Ok(overrides) => overrides,
        Err(e) => return LSystemBuild::failed(format!("error invalid overrides: {e}")),
    };

    let compiled = match compile_source(source, &overrides) {
        Ok(compiled) => compiled,
        Err(diagnostics) => return LSystemBuild::failed(collect_diagnostics(&diagnostics)),
    };
    let diagnostics = collect_diagnostics(&compiled.warnings);

    let realization = match realize(&compiled.spec, &compiled.app, options) {
        Ok(r) => r,
        Err(e) => return LSystemBuild::failed(format!("error {e}")),
    };

    let constants_json =
        serde_json::to_string(&compiled.simple_constants()).unwrap_or_else(|_| "[]".to_owned());

    LSystemBuild {
        diagnostics,
        has_error: false,
        constants_json,
        main_iterations: realization.plan.main,
        subtree_iterations: realization.plan.subtree,
        batches: realization.instance_batches(),
    }
}

/// An empty or blank string means no overrides.
fn parse_overrides(json: &str) -> Result<Overrides, serde_json::Error> {
    if json.trim().is_empty() {
        return Ok(Overrides::new());
    }
    serde_json::from_str(json)
}

fn collect_diagnostics(diagnostics: &[CompilerError]) -> String {
    diagnostics
        .iter()
        .map(format_diagnostic)
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_diagnostic(d: &CompilerError) -> String {
    let label = match d.severity {
        Severity::Warning => "warning",
        Severity::Error => "error",
    };
    format!("{label} {d}")
}
