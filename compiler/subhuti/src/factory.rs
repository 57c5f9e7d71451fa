//! The `Subhuti` factory.

use subhuti_grammar::{AnalysisConfig, GrammarAnalyzer, GrammarValidationError, ValidationReport};
use subhuti_ir::Token;
use subhuti_lexer::{LexError, Lexer, LexerBuildError, TokenDef};
use subhuti_parse::{
    CollectError, ParseError, ParseOptions, ParseOutput, Parser, RecoveryConfig, Rule, TraceMode,
};
use tracing::debug;

use crate::config::analysis_config_from_env;

/// A grammar ready to use: token definitions, start rule, parse options and
/// the analyzer whose caches outlive individual validations.
pub struct Subhuti {
    lexer: Lexer,
    start: Rule,
    options: ParseOptions,
    analysis: AnalysisConfig,
    analyzer: Option<GrammarAnalyzer>,
}

impl Subhuti {
    /// Build the lexer from `token_defs`. Analysis settings come from
    /// [`analysis_config_from_env`].
    pub fn new(token_defs: Vec<TokenDef>, start: Rule) -> Result<Self, LexerBuildError> {
        Ok(Subhuti {
            lexer: Lexer::new(token_defs)?,
            start,
            options: ParseOptions::default(),
            analysis: analysis_config_from_env(),
            analyzer: None,
        })
    }

    #[must_use]
    pub fn with_analysis_config(mut self, config: AnalysisConfig) -> Self {
        self.set_analysis_config(config);
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: ParseOptions) -> Self {
        self.options = options;
        self
    }

    /// Record a rule trace for every parse, returned in [`ParseOutput::trace`]
    /// or [`ParseError::trace`]. With `show_trace` the rendered lines are also
    /// emitted through `tracing` once the parse ends.
    pub fn debug(&mut self, show_trace: bool) -> &mut Self {
        self.options.trace = if show_trace {
            TraceMode::Print
        } else {
            TraceMode::Record
        };
        self
    }

    /// Resynchronize `many_with_recovery` loops with the default settings.
    pub fn enable_error_recovery(&mut self) -> &mut Self {
        self.set_error_recovery(RecoveryConfig::default())
    }

    pub fn set_error_recovery(&mut self, config: RecoveryConfig) -> &mut Self {
        self.options.error_recovery = Some(config);
        self
    }

    pub fn set_analysis_config(&mut self, config: AnalysisConfig) -> &mut Self {
        self.analysis = config.clone();
        if let Some(analyzer) = &mut self.analyzer {
            analyzer.set_config(config);
        }
        self
    }

    pub fn lexer(&self) -> &Lexer {
        &self.lexer
    }

    pub fn start_rule(&self) -> Rule {
        self.start
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    pub fn tokenize(&self, text: &str) -> Result<Vec<Token>, LexError> {
        self.lexer.tokenize(text)
    }

    /// Parse `text`, lexing on demand under the goal each rule asks for.
    pub fn parse(&self, text: &str) -> Result<ParseOutput, ParseError> {
        Parser::from_source(&self.lexer, text)
            .with_options(self.options.clone())
            .parse(&self.start)
    }

    /// Parse an already lexed token stream.
    pub fn parse_tokens(&self, tokens: &[Token]) -> Result<ParseOutput, ParseError> {
        Parser::from_tokens(tokens)
            .with_lexer(&self.lexer)
            .with_options(self.options.clone())
            .parse(&self.start)
    }

    /// The analyzer for the start rule, collecting the grammar on first use.
    pub fn analyzer(&mut self) -> Result<&mut GrammarAnalyzer, CollectError> {
        let analyzer = match self.analyzer.take() {
            Some(analyzer) => analyzer,
            None => {
                let analyzer = GrammarAnalyzer::from_rule(&self.start, self.analysis.clone())?;
                debug!(
                    start = self.start.name,
                    rules = analyzer.grammar().len(),
                    "grammar collected for analysis"
                );
                analyzer
            }
        };
        Ok(self.analyzer.insert(analyzer))
    }

    /// Analyze the grammar. Findings are returned in the report; only a strict
    /// configuration turns errors into `Err`.
    pub fn validate(&mut self) -> Result<ValidationReport, GrammarValidationError> {
        self.analyzer()?.validate()
    }

    /// Drop the collected grammar and every analysis cache.
    pub fn invalidate_analysis(&mut self) {
        self.analyzer = None;
    }
}
