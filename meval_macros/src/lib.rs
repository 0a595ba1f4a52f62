use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::{parse_macro_input, FnArg, ItemFn, PatType, ReturnType, Type};

fn formatted_arg_error_msg(arg_name: &str, arg_pos: usize, fn_name: &str) -> String {
    format!(
        "Expected argument {} ('{}') to be f64, for {}",
        arg_pos, arg_name, fn_name
    )
}

fn is_f64(ty: &Type) -> bool {
    match ty {
        Type::Path(type_path) => type_path
            .path
            .segments
            .last()
            .map_or(false, |segment| segment.ident == "f64"),
        _ => false,
    }
}

/// Turns `fn name(a: f64, b: f64) -> f64` into a slice reducer
/// `fn name(args: &[f64]) -> f64` plus a `NAME_ARITY` constant.
///
/// The generated reducer returns `NaN` when called with the wrong number of
/// arguments; the evaluator never does so for a well-formed tree.
#[proc_macro_attribute]
pub fn meval_fn(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    let fn_name = &input.sig.ident;
    let fn_args = &input.sig.inputs;
    let fn_body = &input.block;
    let fn_attrs = &input.attrs;
    let vis = &input.vis;

    if let ReturnType::Type(_, ty) = &input.sig.output {
        if !is_f64(ty) {
            return syn::Error::new_spanned(ty, format!("{} must return f64", fn_name))
                .to_compile_error()
                .into();
        }
    } else {
        return syn::Error::new_spanned(&input.sig, format!("{} must return f64", fn_name))
            .to_compile_error()
            .into();
    }

    let mut arg_names = Vec::new();

    for (i, arg) in fn_args.iter().enumerate() {
        let FnArg::Typed(PatType { pat, ty, .. }) = arg else {
            return syn::Error::new_spanned(arg, "methods are not supported")
                .to_compile_error()
                .into();
        };
        let arg_name = match **pat {
            syn::Pat::Ident(ref ident) => &ident.ident,
            _ => {
                return syn::Error::new_spanned(pat, "Unsupported pattern")
                    .to_compile_error()
                    .into()
            }
        };
        if !is_f64(ty) {
            let err_msg = formatted_arg_error_msg(&arg_name.to_string(), i, &fn_name.to_string());
            return syn::Error::new_spanned(ty, err_msg).to_compile_error().into();
        }
        arg_names.push(arg_name.clone());
    }

    let args_len = arg_names.len();
    let arity_name = format_ident!("{}_ARITY", fn_name.to_string().to_uppercase());
    let expanded = quote! {
        #[doc = concat!("Number of arguments taken by [`", stringify!(#fn_name), "`].")]
        #vis const #arity_name: usize = #args_len;

        #(#fn_attrs)*
        #vis fn #fn_name(args: &[f64]) -> f64 {
            let &[#(#arg_names),*] = args else {
                return f64::NAN;
            };

            #fn_body
        }
    };

    TokenStream::from(expanded)
}
