//! Shared test constants and helpers for integration tests.

#![allow(dead_code)]

use std::io::Write;

use tempfile::NamedTempFile;

/// One entry of each of the thirteen standard BibTeX entry kinds, in a fixed
/// order. Keys are `Citekey` followed by the capitalized kind.
pub const ALL_KINDS_BIB: &str = r#"
@article{CitekeyArticle,
  author   = {P. J. Cohen},
  title    = {The independence of the continuum hypothesis},
  journal  = {Proceedings of the National Academy of Sciences},
  year     = {1963},
  volume   = {50},
  number   = {6},
  pages    = {1143--1148}
}

@book{CitekeyBook,
  author    = {Leonard Susskind and George Hrabovsky},
  title     = {Classical mechanics: the theoretical minimum},
  publisher = {Penguin Random House},
  address   = {New York, NY},
  year      = {2014}
}

@booklet{CitekeyBooklet,
  title        = {Canoe tours in {S}weden},
  author       = {Maria Swetla},
  howpublished = {Distributed at the Stockholm Tourist Office},
  month        = {July},
  year         = {2015}
}

@inbook{CitekeyInbook,
  author    = {Lisa A. Urry and Michael L. Cain and Steven A. Wasserman and Peter V. Minorsky and Jane B. Reece},
  title     = {Photosynthesis},
  booktitle = {Campbell Biology},
  year      = {2016},
  publisher = {Pearson},
  address   = {New York, NY},
  pages     = {187--221}
}

@incollection{CitekeyIncollection,
  author    = {Shapiro, Howard M.},
  editor    = {Hawley, Teresa S. and Hawley, Robert G.},
  title     = {Flow Cytometry: The Glass Is Half Full},
  booktitle = {Flow Cytometry Protocols},
  year      = {2018},
  publisher = {Springer},
  address   = {New York, NY},
  pages     = {1--10}
}

@inproceedings{CitekeyInproceedings,
  author    = {Holleis, Paul and Wagner, Matthias and Koolwaaij, Johan},
  title     = {Studying mobile context-aware social services in the wild},
  booktitle = {Proc. of the 6th Nordic Conf. on Human-Computer Interaction},
  series    = {NordiCHI},
  year      = {2010},
  pages     = {207--216},
  publisher = {ACM},
  address   = {New York, NY}
}

@manual{CitekeyManual,
  title        = {{R}: A Language and Environment for Statistical Computing},
  author       = {{R Core Team}},
  organization = {R Foundation for Statistical Computing},
  address      = {Vienna, Austria},
  year         = {2018}
}

@mastersthesis{CitekeyMastersthesis,
  author  = {Jian Tang},
  title   = {Spin structure of the nucleon in the asymptotic limit},
  school  = {Massachusetts Institute of Technology},
  year    = {1996},
  address = {Cambridge, MA},
  month   = {September}
}

@misc{CitekeyMisc,
  title        = {{NASA} - Nasa Home Page},
  author       = {{NASA}},
  howpublished = {\url{http://www.nasa.gov/}},
  year         = {2015},
  url          = {http://www.nasa.gov/}
}

@phdthesis{CitekeyPhdthesis,
  author  = {Rempel, Robert Charles},
  title   = {Relaxation Effects for Coupled Nuclear Spins},
  school  = {Stanford University},
  address = {Stanford, CA},
  year    = {1956},
  month   = {June}
}

@proceedings{CitekeyProceedings,
  editor    = {Susan Stepney and Sergey Verlan},
  title     = {Proceedings of the 17th International Conference on Computation and Natural Computation},
  series    = {Lecture Notes in Computer Science},
  volume    = {10867},
  publisher = {Springer},
  address   = {Cham, Switzerland},
  year      = {2018}
}

@techreport{CitekeyTechreport,
  title       = {{W}asatch {S}olar {P}roject Final Report},
  author      = {Bennett, Vicki and Bowman, Kate and Wright, Sarah},
  institution = {Salt Lake City Corporation},
  address     = {Salt Lake City, UT},
  number      = {DOE-SLC-6903-1},
  year        = {2018},
  month       = {September}
}

@unpublished{CitekeyUnpublished,
  author = {Mohinder Suresh},
  title  = {Evolution: a revised theory},
  year   = {2006},
  note   = {Unpublished manuscript}
}
"#;

/// Keys of [`ALL_KINDS_BIB`], in file order.
pub const ALL_KINDS_KEYS: [&str; 13] = [
    "CitekeyArticle",
    "CitekeyBook",
    "CitekeyBooklet",
    "CitekeyInbook",
    "CitekeyIncollection",
    "CitekeyInproceedings",
    "CitekeyManual",
    "CitekeyMastersthesis",
    "CitekeyMisc",
    "CitekeyPhdthesis",
    "CitekeyProceedings",
    "CitekeyTechreport",
    "CitekeyUnpublished",
];

/// A small database with extra fields used by the pass-through tests.
pub const EXTRA_FIELDS_BIB: &str = r#"
@article{entries,
  author = {Ann Alpha},
  title  = {With Extra Fields},
  journal = {Journal of Tests},
  year   = {2020},
  url    = {https://example.com/entries},
  foo    = {bar}
}

@misc{noentries,
  author = {Bob Beta},
  title  = {Without Extra Fields},
  year   = {2021}
}
"#;

/// Helper to create a temporary file with content
pub fn create_temp_file(content: &str, extension: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(extension)
        .tempfile()
        .unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

/// Removes tags and undoes HTML escaping, leaving the highlighted text.
pub fn strip_markup(html: &str) -> String {
    let tags = regex::Regex::new(r"<[^>]+>").unwrap();
    tags.replace_all(html, "")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}
