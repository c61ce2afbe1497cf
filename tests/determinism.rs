use htmlpost::{MinifyConfig, Pipeline};
use proptest::prelude::*;

const CODE_SAMPLE: &str = "<code><span  class=\"k\">x</span><!-- c --></code>";
const KBD_SAMPLE: &str = "<kbd><b  >a</b  ><!-- z --></kbd>";

const FRAGMENTS: [&str; 22] = [
    "<div>",
    "</div>",
    "<p class=\"lead\">",
    "</p>",
    "<a href=\"/x\">",
    "</a>",
    "<em>",
    "</em>",
    "<input type=\"text\" disabled=\"disabled\">",
    "<!-- note -->",
    "<pre>  keep\n  this </pre>",
    "<script>if (a < b) { x(); }</script>",
    "<textarea> t  </textarea>",
    CODE_SAMPLE,
    KBD_SAMPLE,
    "hello",
    "world",
    " ",
    "\n  ",
    "\t",
    "&nbsp;",
    "<br>",
];

fn aggressive() -> MinifyConfig {
    MinifyConfig {
        aggressive: true,
        ..MinifyConfig::default()
    }
}

fn aggressive_with_kbd() -> MinifyConfig {
    MinifyConfig {
        preserve_tags: vec!["kbd".into()],
        ..aggressive()
    }
}

fn page() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(FRAGMENTS.to_vec()), 0..40)
        .prop_map(|parts| parts.concat())
}

#[test]
fn same_input_same_output_across_pipelines() {
    let html = "<div>\n  <p>  a <b> b </b>  c </p>\n  <pre> x </pre>\n</div>";
    let first = Pipeline::new(&aggressive()).unwrap().run(html).unwrap();
    let second = Pipeline::new(&aggressive()).unwrap().run(html).unwrap();
    assert_eq!(first, second);
}

#[test]
fn serial_and_parallel_batches_agree() {
    let documents: Vec<_> = (0..16)
        .map(|i| htmlpost::Document::new(format!("d{i}"), format!("<p>  {i}  <em> x </em> </p>")))
        .collect();

    let parallel = Pipeline::new(&MinifyConfig::default()).unwrap();
    let serial = Pipeline::new(&MinifyConfig {
        parallel: false,
        ..MinifyConfig::default()
    })
    .unwrap();

    assert_eq!(
        parallel.process_batch(documents.clone()),
        serial.process_batch(documents)
    );
}

proptest! {
    #[test]
    fn default_pipeline_is_idempotent(html in page()) {
        let pipeline = Pipeline::new(&MinifyConfig::default()).unwrap();
        let once = pipeline.run(&html).unwrap();
        let twice = pipeline.run(&once).unwrap();
        prop_assert_eq!(twice, once);
    }

    #[test]
    fn preserved_elements_survive_every_transform(html in page()) {
        let out = Pipeline::new(&aggressive_with_kbd()).unwrap().run(&html).unwrap();
        for element in [
            "<pre>  keep\n  this </pre>",
            "<textarea> t  </textarea>",
            CODE_SAMPLE,
            KBD_SAMPLE,
        ] {
            prop_assert_eq!(out.matches(element).count(), html.matches(element).count());
        }
    }

    #[test]
    fn output_never_grows(html in page()) {
        let out = Pipeline::new(&aggressive()).unwrap().run(&html).unwrap();
        prop_assert!(out.len() <= html.len());
    }
}
