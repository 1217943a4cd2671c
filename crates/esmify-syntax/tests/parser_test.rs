//! Parser integration tests
//!
//! Parses the kind of files npm packages ship (UMD wrappers, transpiled
//! CommonJS, hand-written ES modules) and checks spans line up with the text.

use esmify_syntax::ast::{Expression, Statement};
use esmify_syntax::{EditBuffer, parse_module};

#[test]
fn test_umd_wrapper() {
    let source = r#"(function (root, factory) {
    if (typeof define === 'function' && define.amd) {
        define(['exports'], factory);
    } else if (typeof exports === 'object' && typeof exports.nodeName !== 'string') {
        factory(exports);
    } else {
        factory((root.lib = {}));
    }
}(typeof self !== 'undefined' ? self : this, function (exports) {
    exports.action = function () {};
}));
"#;
    let program = parse_module(source).unwrap();
    assert_eq!(program.body.len(), 1);
}

#[test]
fn test_transpiled_commonjs() {
    let source = r#""use strict";
Object.defineProperty(exports, "__esModule", { value: true });
exports.default = void 0;
var _dep = _interopRequireDefault(require("./dep"));
function _interopRequireDefault(obj) { return obj && obj.__esModule ? obj : { default: obj }; }
class Thing extends _dep.default {
  #secret = 1;
  static get kind() { return 'thing'; }
  async *items() { for await (const item of this.source) yield item; }
}
var _default = exports.default = Thing;
"#;
    let program = parse_module(source).unwrap();
    assert_eq!(program.body.len(), 7);
}

#[test]
fn test_es_module() {
    let source = "import { a } from './a.js';\nexport const b = a?.b ?? 1;\nexport default async () => { await import('./c.js'); };\n";
    let program = parse_module(source).unwrap();
    assert_eq!(program.body.len(), 3);
    assert!(program.body.iter().all(Statement::is_module_declaration));
}

#[test]
fn test_spans_slice_the_source() {
    let source = "const x = require('./x');\nmodule.exports = { x };";
    let program = parse_module(source).unwrap();
    let Statement::Expression(statement) = &program.body[1] else {
        panic!("expected expression statement");
    };
    let Expression::Assignment(assignment) = &statement.expression else {
        panic!("expected assignment");
    };
    assert_eq!(assignment.left.span().slice(source), "module.exports");
    assert_eq!(assignment.right.span().slice(source), "{ x }");
    assert_eq!(statement.span.slice(source), "module.exports = { x };");
}

#[test]
fn test_edit_round_trip() {
    let source = "var a = require('a');\nmodule.exports = a;\n";
    let program = parse_module(source).unwrap();
    let mut buffer = EditBuffer::new(source);
    buffer.remove(program.body[0].span().start, program.body[0].span().end + 1).unwrap();
    buffer.prepend("import a from 'a';\n");
    assert_eq!(buffer.to_string(), "import a from 'a';\nmodule.exports = a;\n");
}

#[test]
fn test_syntax_errors_report_locations() {
    let err = parse_module("var a = {\n  b: 1,\n  c 2\n};").unwrap_err();
    let esmify_syntax::Error::Syntax { location, .. } = err;
    assert_eq!(location.line, 3);
    assert_eq!(location.column, 4);
}
