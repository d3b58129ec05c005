//! Procedural macros for the dotscript execution shim.
//!
//! This crate provides the `#[dotscript::script_main]` attribute, which turns
//! a script function into a complete program: the function is registered as
//! the entry point and a `main` is generated that runs it through the host.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::spanned::Spanned;
use syn::{FnArg, ItemFn, LitStr, ReturnType, Type, parse_macro_input};

/// Entry-point name used when the attribute does not specify one.
const DEFAULT_ENTRY_NAME: &str = "DotScriptMain";

/// Marks a function as the script entry point and generates `main`.
///
/// # Accepted signatures
///
/// - **Parameters**: none, `&[String]` (process arguments) and/or
///   `&mut SessionState`, each at most once and in any order
/// - **Return**: nothing, `i32`, or a `Result` of either
///
/// Anything else is rejected at compile time.
///
/// # Example
///
/// ```rust,ignore
/// use dotscript::prelude::*;
///
/// #[dotscript::script_main(name = "ScriptMain")]
/// fn publish(args: &[String], state: &mut SessionState) -> i32 {
///     state.set("PUBLISHED", args.join(","));
///     0
/// }
/// ```
///
/// # Behavior
///
/// The function is kept as written. The generated `main` registers it under
/// `name` (default `DotScriptMain`) and exits with the status returned by
/// `dotscript::host::run`.
#[proc_macro_attribute]
pub fn script_main(attr: TokenStream, item: TokenStream) -> TokenStream {
    let mut name: Option<LitStr> = None;
    let attr_parser = syn::meta::parser(|meta| {
        if meta.path.is_ident("name") {
            name = Some(meta.value()?.parse()?);
            Ok(())
        } else {
            Err(meta.error("unsupported script_main attribute, expected `name = \"...\"`"))
        }
    });
    parse_macro_input!(attr with attr_parser);

    let input = parse_macro_input!(item as ItemFn);

    match expand(name, &input) {
        Ok(tokens) => TokenStream::from(tokens),
        Err(err) => TokenStream::from(err.to_compile_error()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Param {
    Args,
    State,
}

fn expand(name: Option<LitStr>, input: &ItemFn) -> syn::Result<TokenStream2> {
    validate_signature(input)?;

    let entry_name = name
        .map(|lit| lit.value())
        .unwrap_or_else(|| DEFAULT_ENTRY_NAME.to_string());
    if entry_name.is_empty() {
        return Err(syn::Error::new(input.sig.ident.span(), "entry point name must not be empty"));
    }

    let ident = &input.sig.ident;

    Ok(quote! {
        #input

        fn main() {
            ::std::process::exit(::dotscript::host::run(
                ::dotscript::Registry::new().register(#entry_name, #ident),
            ));
        }
    })
}

fn validate_signature(input: &ItemFn) -> syn::Result<()> {
    let sig = &input.sig;

    if sig.ident == "main" {
        return Err(syn::Error::new(
            sig.ident.span(),
            "the script entry point cannot be named `main`; `main` is generated",
        ));
    }
    if let Some(asyncness) = &sig.asyncness {
        return Err(syn::Error::new(asyncness.span(), "the script entry point cannot be async"));
    }
    if !sig.generics.params.is_empty() {
        return Err(syn::Error::new(
            sig.generics.span(),
            "the script entry point cannot be generic",
        ));
    }

    let mut seen = Vec::new();
    for arg in &sig.inputs {
        let param = classify_param(arg)?;
        if seen.contains(&param) {
            return Err(syn::Error::new(
                arg.span(),
                "main method contains invalid parameters: each capability may be requested once",
            ));
        }
        seen.push(param);
    }

    validate_return(&sig.output)
}

fn classify_param(arg: &FnArg) -> syn::Result<Param> {
    let invalid = |span| {
        syn::Error::new(
            span,
            "main method contains invalid parameters: expected `&[String]` or `&mut SessionState`",
        )
    };

    let FnArg::Typed(pat_type) = arg else {
        return Err(invalid(arg.span()));
    };
    let Type::Reference(reference) = pat_type.ty.as_ref() else {
        return Err(invalid(pat_type.ty.span()));
    };

    match (reference.mutability.is_some(), reference.elem.as_ref()) {
        (false, Type::Slice(slice)) if last_ident_is(&slice.elem, "String") => Ok(Param::Args),
        (true, elem) if last_ident_is(elem, "SessionState") => Ok(Param::State),
        _ => Err(invalid(pat_type.ty.span())),
    }
}

fn validate_return(output: &ReturnType) -> syn::Result<()> {
    let ReturnType::Type(_, ty) = output else {
        return Ok(());
    };

    let accepted = match ty.as_ref() {
        Type::Tuple(tuple) => tuple.elems.is_empty(),
        other => last_ident_is(other, "i32") || last_ident_is(other, "Result"),
    };

    if accepted {
        Ok(())
    } else {
        Err(syn::Error::new(
            ty.span(),
            "the script entry point must return `()`, `i32`, or a `Result` of either",
        ))
    }
}

fn last_ident_is(ty: &Type, ident: &str) -> bool {
    match ty {
        Type::Path(path) => path
            .path
            .segments
            .last()
            .is_some_and(|segment| segment.ident == ident),
        Type::Paren(inner) => last_ident_is(&inner.elem, ident),
        Type::Group(inner) => last_ident_is(&inner.elem, ident),
        _ => false,
    }
}
