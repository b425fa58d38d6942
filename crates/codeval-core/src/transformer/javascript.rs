pub(super) const RUNNER_SCRIPT: &str = r#"// declare main function
{{code}}

// decode and prepare input object
var inputs_obj = JSON.parse(Buffer.from('{{inputs}}', 'base64').toString('utf-8'))

// execute main function
var output_obj = main(inputs_obj)

// convert output to json and print
var output_json = JSON.stringify(output_obj, null, 4)
var result = `<<RESULT>>${output_json}<<RESULT>>`
console.log(result)
"#;
