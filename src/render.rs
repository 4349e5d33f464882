//! C loader rendering
//!
//! Produces the text of `alw.h` and `alw.c` from a [`BindingTable`]. The
//! fixed parts of both files live in the templates below; the per-symbol
//! parts are padded into columns so the output diffs cleanly.

use crate::config::LibraryConfig;
use crate::naming::BindingTable;

/// Column width of the pointer type in slot declarations
const TYPE_COLUMN: usize = 52;

/// Column width of the original name in `#define` redirects
const MACRO_COLUMN: usize = 45;

const DEDICATION: &str = r#"/*

	This file was generated with alw-gen, part of alw
	(hosted at https://github.com/kwertz/alw)

	alw is based on gl3w, hosted at https://github.com/skaslev/gl3w

	This is free and unencumbered software released into the public domain.

	Anyone is free to copy, modify, publish, use, compile, sell, or
	distribute this software, either in source code form or as a compiled
	binary, for any purpose, commercial or non-commercial, and by any
	means.

	In jurisdictions that recognize copyright laws, the author or authors
	of this software dedicate any and all copyright interest in the
	software to the public domain. We make this dedication for the benefit
	of the public at large and to the detriment of our heirs and
	successors. We intend this dedication to be an overt act of
	relinquishment in perpetuity of all present and future rights to this
	software under copyright law.

	THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
	EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
	MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT.
	IN NO EVENT SHALL THE AUTHORS BE LIABLE FOR ANY CLAIM, DAMAGES OR
	OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE,
	ARISING FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR
	OTHER DEALINGS IN THE SOFTWARE.

*/

"#;

const HEADER_PRELUDE: &str = r#"#ifndef __alw_h_
#define __alw_h_

#include <AL/alc.h>
#define AL_NO_PROTOTYPES
#include <AL/al.h>

#ifdef __cplusplus
extern "C" {
#endif

typedef void (*ALWalproc)(void);

/* alw api */
int alwInit(void);
void alwTerminate(void);
ALWalproc alwGetProcAddr(const char *proc);

/* OpenAL functions */
"#;

const HEADER_EPILOGUE: &str = r#"
#ifdef __cplusplus
}
#endif

#endif
"#;

const SOURCE_PRELUDE: &str = r#"#include <AL/alw.h>

#ifdef _WIN32
#define WIN32_LEAN_AND_MEAN 1
#include <windows.h>

static HMODULE libal;

static int open_libal(void)
{
	libal = LoadLibraryA("@WINDOWS_LIBRARY@");
	return libal != NULL;
}

static void close_libal(void)
{
	FreeLibrary(libal);
}

static void *get_proc(const char *proc)
{
	return GetProcAddress(libal, proc);
}
#elif defined(__APPLE__) || defined(__APPLE_CC__)
#include <Carbon/Carbon.h>

CFBundleRef bundle;
CFURLRef bundleURL;

static int open_libal(void)
{
	bundleURL = CFURLCreateWithFileSystemPath(kCFAllocatorDefault,
		CFSTR("@APPLE_FRAMEWORK@"),
		kCFURLPOSIXPathStyle, true);

	bundle = CFBundleCreate(kCFAllocatorDefault, bundleURL);
	return bundle != NULL;
}

static void close_libal(void)
{
	CFRelease(bundle);
	CFRelease(bundleURL);
}

static void *get_proc(const char *proc)
{
	void *res;

	CFStringRef procname = CFStringCreateWithCString(kCFAllocatorDefault, proc,
		kCFStringEncodingASCII);
	res = CFBundleGetFunctionPointerForName(bundle, procname);
	CFRelease(procname);
	return res;
}
#else
#include <dlfcn.h>

static void *libal;

static int open_libal(void)
{
	libal = dlopen("@UNIX_LIBRARY@", RTLD_LAZY | RTLD_GLOBAL);
	return libal != NULL;
}

static void close_libal(void)
{
	dlclose(libal);
}

static void *get_proc(const char *proc)
{
	return dlsym(libal, proc);
}
#endif

static void load_procs(void);

int alwInit(void)
{
	int res = open_libal();
	if (res) load_procs();
	return res ? 0 : -1;
}

void alwTerminate(void)
{
	close_libal();
}

ALWalproc alwGetProcAddr(const char *proc)
{
	return get_proc(proc);
}

"#;

const SOURCE_LOAD_PROCS: &str = r#"
static void load_procs(void)
{
"#;

/// Render `alw.h`
pub fn render_header(bindings: &BindingTable) -> String {
    let mut out = String::with_capacity(
        DEDICATION.len() + HEADER_PRELUDE.len() + HEADER_EPILOGUE.len() + bindings.len() * 160,
    );
    out.push_str(DEDICATION);
    out.push_str(HEADER_PRELUDE);

    for binding in bindings {
        out.push_str(&format!(
            "extern {:<width$} {};\n",
            binding.pointer_type,
            binding.alias,
            width = TYPE_COLUMN
        ));
    }
    out.push('\n');

    for binding in bindings {
        let (from, to) = binding.macro_redirect();
        out.push_str(&format!("#define {:<width$} {}\n", from, to, width = MACRO_COLUMN));
    }

    out.push_str(HEADER_EPILOGUE);
    out
}

/// Substitute every placeholder of `template` in one left-to-right pass
///
/// Substituted values are copied verbatim and never rescanned.
fn fill_placeholders(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    loop {
        let next = values
            .iter()
            .filter_map(|&(name, value)| rest.find(name).map(|idx| (idx, name, value)))
            .min_by_key(|&(idx, _, _)| idx);

        match next {
            Some((idx, name, value)) => {
                out.push_str(&rest[..idx]);
                out.push_str(value);
                rest = &rest[idx + name.len()..];
            }
            None => {
                out.push_str(rest);
                return out;
            }
        }
    }
}

/// Render `alw.c` with the backing library names from `library`
pub fn render_source(bindings: &BindingTable, library: &LibraryConfig) -> String {
    let prelude = fill_placeholders(
        SOURCE_PRELUDE,
        &[
            ("@WINDOWS_LIBRARY@", library.windows.as_str()),
            ("@APPLE_FRAMEWORK@", library.apple_framework.as_str()),
            ("@UNIX_LIBRARY@", library.unix.as_str()),
        ],
    );

    let mut out = String::with_capacity(
        DEDICATION.len() + prelude.len() + SOURCE_LOAD_PROCS.len() + bindings.len() * 160,
    );
    out.push_str(DEDICATION);
    out.push_str(&prelude);

    for binding in bindings {
        out.push_str(&format!(
            "{:<width$} {};\n",
            binding.pointer_type,
            binding.alias,
            width = TYPE_COLUMN
        ));
    }

    out.push_str(SOURCE_LOAD_PROCS);
    for binding in bindings {
        out.push_str(&format!(
            "\t{} = ({}) get_proc(\"{}\");\n",
            binding.alias, binding.pointer_type, binding.symbol
        ));
    }
    out.push_str("}\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::SymbolSet;

    fn table(symbols: &[&str]) -> BindingTable {
        let set: SymbolSet = symbols.iter().copied().collect();
        BindingTable::from_symbols(&set).unwrap()
    }

    #[test]
    fn test_header_starts_with_dedication() {
        let header = render_header(&table(&["alEnable"]));
        assert!(header.starts_with("/*\n\n\tThis file was generated with alw-gen"));
        assert!(header.contains("public domain"));
    }

    #[test]
    fn test_header_declares_lifecycle() {
        let header = render_header(&table(&[]));
        assert!(header.contains("int alwInit(void);\n"));
        assert!(header.contains("void alwTerminate(void);\n"));
        assert!(header.contains("ALWalproc alwGetProcAddr(const char *proc);\n"));
        assert!(header.contains("#ifdef __cplusplus\nextern \"C\" {\n#endif"));
        assert!(header.ends_with("#ifdef __cplusplus\n}\n#endif\n\n#endif\n"));
    }

    #[test]
    fn test_header_slot_and_macro_lines() {
        let header = render_header(&table(&["alGetError", "alcOpenDevice"]));

        let extern_line = format!("extern {:<52} alwGetError;\n", "LPALGETERROR");
        assert!(header.contains(&extern_line));
        assert!(header.contains(&format!(
            "extern {:<52} alcwOpenDevice;\n",
            "LPALCOPENDEVICE"
        )));

        assert!(header.contains(&format!("#define {:<45} alwGetError\n", "alGetError")));
        assert!(header.contains(&format!(
            "#define {:<45} alcwOpenDevice\n",
            "alcOpenDevice"
        )));
    }

    #[test]
    fn test_header_column_alignment() {
        let header = render_header(&table(&["alEnable"]));
        let line = header
            .lines()
            .find(|l| l.starts_with("extern LPALENABLE"))
            .unwrap();
        // "extern " + 52-wide type + " "
        assert_eq!(line.find("alwEnable"), Some(7 + 52 + 1));

        let define = header
            .lines()
            .find(|l| l.starts_with("#define alEnable"))
            .unwrap();
        assert_eq!(define.find("alwEnable"), Some(8 + 45 + 1));
    }

    #[test]
    fn test_overlong_type_is_not_truncated() {
        let long = format!("al{}", "X".repeat(60));
        let header = render_header(&table(&[long.as_str()]));
        assert!(header.contains(&format!(
            "extern LP{} alw{};",
            long.to_uppercase(),
            "X".repeat(60)
        )));
    }

    #[test]
    fn test_empty_table_renders_valid_header() {
        let header = render_header(&table(&[]));
        assert!(header.contains("/* OpenAL functions */\n\n\n#ifdef __cplusplus\n}"));
    }

    #[test]
    fn test_source_has_three_backends() {
        let source = render_source(&table(&[]), &LibraryConfig::default());
        assert!(source.contains("#ifdef _WIN32"));
        assert!(source.contains("LoadLibraryA(\"openal32.dll\")"));
        assert!(source.contains("#elif defined(__APPLE__) || defined(__APPLE_CC__)"));
        assert!(source.contains("CFSTR(\"/System/Library/Frameworks/OpenAL.framework\")"));
        assert!(source.contains("dlopen(\"libopenal.so.1\", RTLD_LAZY | RTLD_GLOBAL)"));
        assert!(!source.contains('@'));
    }

    #[test]
    fn test_source_init_contract() {
        let source = render_source(&table(&[]), &LibraryConfig::default());
        assert!(source.contains(concat!(
            "int alwInit(void)\n{\n",
            "\tint res = open_libal();\n",
            "\tif (res) load_procs();\n",
            "\treturn res ? 0 : -1;\n}"
        )));
        assert!(source.contains("void alwTerminate(void)\n{\n\tclose_libal();\n}"));
    }

    #[test]
    fn test_source_loads_every_symbol() {
        let source = render_source(
            &table(&["alGetError", "alcOpenDevice"]),
            &LibraryConfig::default(),
        );
        assert!(source.contains(&format!("{:<52} alwGetError;\n", "LPALGETERROR")));
        assert!(source.contains("\talwGetError = (LPALGETERROR) get_proc(\"alGetError\");\n"));
        assert!(source.contains(
            "\talcwOpenDevice = (LPALCOPENDEVICE) get_proc(\"alcOpenDevice\");\n"
        ));
        assert!(source.ends_with("get_proc(\"alcOpenDevice\");\n}\n"));
    }

    #[test]
    fn test_source_uses_configured_libraries() {
        let library = LibraryConfig {
            windows: "soft_oal.dll".to_string(),
            apple_framework: "/Library/Frameworks/OpenAL-Soft.framework".to_string(),
            unix: "libopenal.so".to_string(),
        };
        let source = render_source(&table(&[]), &library);
        assert!(source.contains("LoadLibraryA(\"soft_oal.dll\")"));
        assert!(source.contains("CFSTR(\"/Library/Frameworks/OpenAL-Soft.framework\")"));
        assert!(source.contains("dlopen(\"libopenal.so\", RTLD_LAZY | RTLD_GLOBAL)"));
        assert!(!source.contains("openal32.dll"));
    }

    #[test]
    fn test_library_name_containing_placeholder_is_kept_verbatim() {
        let library = LibraryConfig {
            windows: "x@UNIX_LIBRARY@.dll".to_string(),
            apple_framework: "/Frameworks/@WINDOWS_LIBRARY@.framework".to_string(),
            unix: "libopenal.so.1".to_string(),
        };
        let source = render_source(&table(&[]), &library);
        assert!(source.contains("LoadLibraryA(\"x@UNIX_LIBRARY@.dll\")"));
        assert!(source.contains("CFSTR(\"/Frameworks/@WINDOWS_LIBRARY@.framework\")"));
        assert!(source.contains("dlopen(\"libopenal.so.1\", RTLD_LAZY | RTLD_GLOBAL)"));
        assert!(!source.contains("xlibopenal.so.1.dll"));
    }

    #[test]
    fn test_fill_placeholders_single_pass() {
        let filled = fill_placeholders("<@A@|@B@|@A@>", &[("@A@", "@B@"), ("@B@", "b")]);
        assert_eq!(filled, "<@B@|b|@B@>");
        assert_eq!(fill_placeholders("no markers", &[("@A@", "a")]), "no markers");
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let bindings = table(&["alSourcePlay", "alcCloseDevice", "alBufferData"]);
        let library = LibraryConfig::default();
        assert_eq!(render_header(&bindings), render_header(&bindings));
        assert_eq!(
            render_source(&bindings, &library),
            render_source(&bindings, &library)
        );
    }
}
