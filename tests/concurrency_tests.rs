//! Concurrency and thread safety tests for htmlpost

use std::sync::Arc;
use std::thread;

use htmlpost::{Document, MinifyConfig, Pipeline};

fn page(i: usize) -> String {
    format!(
        "<html>\n<body>\n  <h1>  Page {i}  </h1>\n  <pre>  {i}  </pre>\n  <p> a <a href=\"/{i}\"> link </a> b </p>\n</body>\n</html>"
    )
}

fn expected(i: usize) -> String {
    format!(
        "<html><body><h1>Page {i}</h1><pre>  {i}  </pre><p>a <a href=\"/{i}\">link</a> b</p></body></html>"
    )
}

#[test]
fn shared_pipeline_across_threads() {
    let pipeline = Arc::new(Pipeline::new(&MinifyConfig::default()).unwrap());

    let handles: Vec<_> = (0..10)
        .map(|i| {
            let pipeline = Arc::clone(&pipeline);
            thread::spawn(move || pipeline.run(&page(i)).expect("run should succeed"))
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.join().unwrap(), expected(i), "thread {i} diverged");
    }
}

#[test]
fn scoped_threads_share_a_borrowed_pipeline() {
    let pipeline = Pipeline::new(&MinifyConfig::default()).unwrap();

    thread::scope(|scope| {
        for i in 0..8 {
            let pipeline = &pipeline;
            scope.spawn(move || {
                for _ in 0..25 {
                    assert_eq!(pipeline.run(&page(i)).unwrap(), expected(i));
                }
            });
        }
    });
}

#[test]
fn large_parallel_batch_keeps_order() {
    let pipeline = Pipeline::new(&MinifyConfig::default()).unwrap();
    let documents: Vec<_> = (0..500)
        .map(|i| Document::new(format!("doc-{i}"), page(i)))
        .collect();

    let processed = pipeline.process_batch(documents);

    assert_eq!(processed.len(), 500);
    for (i, doc) in processed.iter().enumerate() {
        assert_eq!(doc.id, format!("doc-{i}"));
        assert_eq!(doc.html, expected(i));
        assert!(doc.is_optimized());
    }
}

#[test]
fn batches_from_many_threads() {
    let pipeline = Arc::new(Pipeline::new(&MinifyConfig::default()).unwrap());

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let pipeline = Arc::clone(&pipeline);
            thread::spawn(move || {
                let documents: Vec<_> = (0..50)
                    .map(|i| Document::new(format!("t{t}-{i}"), page(t * 100 + i)))
                    .collect();
                pipeline.process_batch(documents)
            })
        })
        .collect();

    for (t, handle) in handles.into_iter().enumerate() {
        let processed = handle.join().unwrap();
        for (i, doc) in processed.iter().enumerate() {
            assert_eq!(doc.html, expected(t * 100 + i));
        }
    }
}
