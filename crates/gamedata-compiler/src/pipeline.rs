//! End-to-end compilation: reflect, lay out, write and generate.

use tracing::debug;

use crate::Result;
use crate::codegen::cpp;
use crate::config::Config;
use crate::emit::DataWriter;
use crate::meta::MetaCode;
use crate::reflect::{DataUnit, DefaultClassifier, Reflector, TypeClassifier};
use crate::signature_db::SignatureLookup;
use crate::stream::{DataStream, FinalizedStream};

/// Output of one compiler run.
#[derive(Debug)]
pub struct Compiled {
    /// Container holding the unit and every unit it references.
    pub data: FinalizedStream,
    /// C++ declarations reading `data`.
    pub code: String,
}

/// Compile `unit` with the default classifier.
pub fn compile(unit: &DataUnit, signatures: &dyn SignatureLookup, config: &Config) -> Result<Compiled> {
    Compiler::new(config).compile(unit, signatures)
}

pub struct Compiler<'a> {
    config: &'a Config,
    classifier: &'a dyn TypeClassifier,
}

impl<'a> Compiler<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            classifier: &DefaultClassifier,
        }
    }

    /// Use a custom type classifier for reflection.
    pub fn with_classifier(mut self, classifier: &'a dyn TypeClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Reflect `unit` and solve its layout.
    ///
    /// Returns the model and the row of the root data unit.
    pub fn analyze(&self, unit: &DataUnit) -> Result<(MetaCode, usize)> {
        let mut code = MetaCode::new();
        let root = Reflector::new(self.config)
            .with_classifier(self.classifier)
            .analyze(unit, &mut code)?;
        code.solve_layout();
        Ok((code, root))
    }

    /// Run every stage. Data and code come from the same laid-out model.
    pub fn compile(&self, unit: &DataUnit, signatures: &dyn SignatureLookup) -> Result<Compiled> {
        let (code, root) = self.analyze(unit)?;

        let stream =
            DataStream::new(self.config.platform).with_pointer_mode(self.config.pointer_mode);
        let data = DataWriter::new(&code, signatures, stream).write(root)?;
        let source = cpp::emit(&code, &self.config.codegen)?;

        debug!(
            signature = unit.signature(),
            units = data.units.len(),
            bytes = data.bytes.len(),
            "pipeline: compiled"
        );
        Ok(Compiled { data, code: source })
    }
}
