//! Elixir NIF Bindings
//!
//! Exposes collected and parallel parsing to `RustySax.Native`. Events are
//! tagged tuples, strings are binaries and absent values are `nil`.

use rustler::{Binary, Encoder, Env, NewBinary, NifResult, Term};

use crate::config::ParserConfig;
use crate::core::attributes::Attributes;
use crate::error::SaxError;
use crate::sax::{EventCollector, SaxEvent, SaxParser};
use crate::strategy;

// Pre-defined atoms for efficiency - created once at compile time
rustler::atoms! {
    ok,
    error,
    start_document,
    end_document,
    xml_declaration,
    start_element,
    end_element,
    start_prefix_mapping,
    end_prefix_mapping,
    characters,
    ignorable_whitespace,
    processing_instruction,
    skipped_entity,
    comment,
    start_cdata,
    end_cdata,
    start_dtd,
    end_dtd,
    start_entity,
    end_entity,
    element_decl,
    attribute_decl,
    internal_entity_decl,
    external_entity_decl,
    notation_decl,
    unparsed_entity_decl,
    warning,
    fatal_error,
}

/// Convert a string to a binary term (more efficient than .encode())
#[inline]
fn str_to_binary<'a>(env: Env<'a>, s: &str) -> Term<'a> {
    let bytes = s.as_bytes();
    let mut binary = NewBinary::new(env, bytes.len());
    binary.as_mut_slice().copy_from_slice(bytes);
    binary.into()
}

fn opt_to_term<'a>(env: Env<'a>, s: Option<&str>) -> Term<'a> {
    match s {
        Some(s) => str_to_binary(env, s),
        None => rustler::types::atom::nil().encode(env),
    }
}

/// `{message, line, column}`
fn diagnostic_to_term<'a>(env: Env<'a>, err: &SaxError) -> Term<'a> {
    (
        str_to_binary(env, &err.message),
        err.position.line,
        err.position.column,
    )
        .encode(env)
}

/// Attributes as a list of `{uri, local_name, qname, value}`
fn attributes_to_term<'a>(env: Env<'a>, attributes: &Attributes) -> Term<'a> {
    let mut list = Term::list_new_empty(env);
    for attr in attributes.iter().rev() {
        let tuple = (
            opt_to_term(env, attr.uri.as_deref()),
            str_to_binary(env, attr.local_name()),
            str_to_binary(env, attr.name()),
            str_to_binary(env, &attr.value),
        );
        list = list.list_prepend(tuple.encode(env));
    }
    list
}

/// Convert a single event to an Elixir term
fn event_to_term<'a>(env: Env<'a>, event: &SaxEvent) -> Term<'a> {
    let s = |text: &str| str_to_binary(env, text);
    let o = |text: &Option<String>| opt_to_term(env, text.as_deref());

    match event {
        SaxEvent::StartDocument => start_document().encode(env),
        SaxEvent::EndDocument => end_document().encode(env),
        SaxEvent::XmlDeclaration {
            version,
            encoding,
            standalone,
        } => (xml_declaration(), s(version), o(encoding), *standalone).encode(env),
        SaxEvent::StartElement {
            uri,
            local_name,
            qname,
            attributes,
        } => (
            start_element(),
            o(uri),
            s(local_name),
            s(qname),
            attributes_to_term(env, attributes),
        )
            .encode(env),
        SaxEvent::EndElement { uri, local_name, qname } => {
            (end_element(), o(uri), s(local_name), s(qname)).encode(env)
        }
        SaxEvent::StartPrefixMapping { prefix, uri } => (start_prefix_mapping(), s(prefix), s(uri)).encode(env),
        SaxEvent::EndPrefixMapping { prefix } => (end_prefix_mapping(), s(prefix)).encode(env),
        SaxEvent::Characters(text) => (characters(), s(text)).encode(env),
        SaxEvent::IgnorableWhitespace(text) => (ignorable_whitespace(), s(text)).encode(env),
        SaxEvent::ProcessingInstruction { target, data } => {
            (processing_instruction(), s(target), s(data)).encode(env)
        }
        SaxEvent::SkippedEntity(name) => (skipped_entity(), s(name)).encode(env),
        SaxEvent::Comment(text) => (comment(), s(text)).encode(env),
        SaxEvent::StartCData => start_cdata().encode(env),
        SaxEvent::EndCData => end_cdata().encode(env),
        SaxEvent::StartDtd {
            name,
            public_id,
            system_id,
        } => (start_dtd(), s(name), o(public_id), o(system_id)).encode(env),
        SaxEvent::EndDtd => end_dtd().encode(env),
        SaxEvent::StartEntity(name) => (start_entity(), s(name)).encode(env),
        SaxEvent::EndEntity(name) => (end_entity(), s(name)).encode(env),
        SaxEvent::ElementDecl { name, model } => (element_decl(), s(name), s(model)).encode(env),
        SaxEvent::AttributeDecl {
            element_name,
            attribute_name,
            att_type,
            mode,
            default_value,
        } => (
            attribute_decl(),
            s(element_name),
            s(attribute_name),
            s(att_type),
            o(mode),
            o(default_value),
        )
            .encode(env),
        SaxEvent::InternalEntityDecl { name, value } => (internal_entity_decl(), s(name), s(value)).encode(env),
        SaxEvent::ExternalEntityDecl {
            name,
            public_id,
            system_id,
        } => (external_entity_decl(), s(name), o(public_id), o(system_id)).encode(env),
        SaxEvent::NotationDecl {
            name,
            public_id,
            system_id,
        } => (notation_decl(), s(name), o(public_id), o(system_id)).encode(env),
        SaxEvent::UnparsedEntityDecl {
            name,
            public_id,
            system_id,
            notation,
        } => (
            unparsed_entity_decl(),
            s(name),
            o(public_id),
            o(system_id),
            s(notation),
        )
            .encode(env),
        SaxEvent::Warning(err) => (warning(), diagnostic_to_term(env, err)).encode(env),
        SaxEvent::Error(err) => (error(), diagnostic_to_term(env, err)).encode(env),
        SaxEvent::FatalError(err) => (fatal_error(), diagnostic_to_term(env, err)).encode(env),
    }
}

fn events_to_term<'a>(env: Env<'a>, events: &[SaxEvent]) -> Term<'a> {
    let mut list = Term::list_new_empty(env);
    for event in events.iter().rev() {
        list = list.list_prepend(event_to_term(env, event));
    }
    list
}

fn result_to_term<'a>(env: Env<'a>, result: Result<Vec<SaxEvent>, SaxError>) -> Term<'a> {
    match result {
        Ok(events) => (ok(), events_to_term(env, &events)).encode(env),
        Err(err) => (error(), str_to_binary(env, &err.to_string())).encode(env),
    }
}

/// Parse one document: `{:ok, events}` or `{:error, message}`
#[rustler::nif(schedule = "DirtyCpu")]
fn parse_events<'a>(env: Env<'a>, input: Binary<'a>) -> NifResult<Term<'a>> {
    let mut parser = SaxParser::new(EventCollector::new());
    let result = parser
        .parse_bytes(input.as_slice())
        .map(|()| parser.into_sink().into_events());
    Ok(result_to_term(env, result))
}

/// Parse a list of documents concurrently, one result per document
#[rustler::nif(schedule = "DirtyCpu")]
fn parse_parallel<'a>(env: Env<'a>, inputs: Vec<Binary<'a>>) -> NifResult<Term<'a>> {
    let documents: Vec<&[u8]> = inputs.iter().map(|b| b.as_slice()).collect();
    let results = strategy::parse_parallel_bytes(&documents, ParserConfig::default());

    let mut list = Term::list_new_empty(env);
    for result in results.into_iter().rev() {
        list = list.list_prepend(result_to_term(env, result));
    }
    Ok(list)
}

rustler::init!("Elixir.RustySax.Native");
