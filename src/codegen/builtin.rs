//! Built-in template sets.

use super::template::{escape_html, escape_python_string, TemplateSet, CHILDREN_PLACEHOLDER};

pub fn html() -> TemplateSet {
    TemplateSet::new("html")
        .with_description("Static HTML page")
        .with_escape(escape_html)
        .with_prologue(&["<!DOCTYPE html>", "<html>", "<body>"])
        .with_epilogue(&["</body>", "</html>"])
        .with_lines(
            "container",
            &[
                r#"<div class="{role}" id="{var}">"#,
                CHILDREN_PLACEHOLDER,
                "</div>",
            ],
        )
        .with_lines("button", &[r#"<button id="{var}">{label}</button>"#])
        .with_lines("input", &[r#"<input type="text" id="{var}">"#])
        .with_lines(
            "checkbox",
            &[r#"<input type="checkbox" id="{var}" value="{label}">"#],
        )
        .with_lines("label", &[r#"<span id="{var}">{text}</span>"#])
        .with_lines("separator", &[r#"<hr id="{var}">"#])
        .with_default_lines(&[r#"<div class="{role}" id="{var}">{text}</div>"#])
}

pub fn tkinter() -> TemplateSet {
    TemplateSet::new("tkinter")
        .with_description("Python tkinter script")
        .with_escape(escape_python_string)
        .with_prologue(&["import tkinter as tk", "", "root = tk.Tk()"])
        .with_epilogue(&["", "root.mainloop()"])
        .flat()
        .with_lines(
            "container",
            &[
                r#"{var} = tk.Frame({parent_var}, borderwidth=1, relief="solid")"#,
                "{var}.pack(padx=4, pady=4)",
            ],
        )
        .with_lines(
            "button",
            &[
                r#"{var} = tk.Button({parent_var}, text="{label}")"#,
                "{var}.pack()",
            ],
        )
        .with_lines("input", &["{var} = tk.Entry({parent_var})", "{var}.pack()"])
        .with_lines(
            "checkbox",
            &["{var} = tk.Checkbutton({parent_var})", "{var}.pack()"],
        )
        .with_lines(
            "label",
            &[
                r#"{var} = tk.Label({parent_var}, text="{text}")"#,
                "{var}.pack()",
            ],
        )
        .with_lines(
            "separator",
            &[
                r#"{var} = tk.Frame({parent_var}, height=1, bg="black")"#,
                r#"{var}.pack(fill="x")"#,
            ],
        )
        .with_default_lines(&[
            r#"{var} = tk.Label({parent_var}, text="{text}")"#,
            "{var}.pack()",
        ])
}
